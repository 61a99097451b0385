use std::fmt;

use super::RecordDraft;

pub const MAX_TITLE_LEN: usize = 100;
pub const MAX_AUTHOR_LEN: usize = 100;
pub const MAX_CATEGORY_LEN: usize = 50;
pub const MAX_DESCRIPTION_LEN: usize = 500;
pub const MAX_EXTERNAL_CODE_LEN: usize = 20;
pub const MIN_PUBLICATION_YEAR: i32 = 1000;
pub const MAX_PUBLICATION_YEAR: i32 = 2100;

/// A field constraint violated by a draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is empty or whitespace.
    Required(&'static str),
    /// A field exceeds its maximum length in code points.
    TooLong {
        field: &'static str,
        max: usize,
        actual: usize,
    },
    /// The publication year lies outside the accepted range.
    YearOutOfRange(i32),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::Required(field) => write!(f, "{} is required", field),
            ValidationError::TooLong { field, max, actual } => write!(
                f,
                "{} must not exceed {} characters (got {})",
                field, max, actual
            ),
            ValidationError::YearOutOfRange(year) => write!(
                f,
                "publication year must be between {} and {} (got {})",
                MIN_PUBLICATION_YEAR, MAX_PUBLICATION_YEAR, year
            ),
        }
    }
}

impl std::error::Error for ValidationError {}

impl RecordDraft {
    /// Check the draft against the catalog's field constraints.
    ///
    /// Lengths are counted in code points. The first violation found is
    /// returned.
    pub fn validate(&self) -> Result<(), ValidationError> {
        required("title", &self.title)?;
        required("author", &self.author)?;
        required("category", &self.category)?;

        max_len("title", &self.title, MAX_TITLE_LEN)?;
        max_len("author", &self.author, MAX_AUTHOR_LEN)?;
        max_len("category", &self.category, MAX_CATEGORY_LEN)?;
        max_len("description", &self.description, MAX_DESCRIPTION_LEN)?;
        max_len("externalCode", &self.external_code, MAX_EXTERNAL_CODE_LEN)?;

        if let Some(year) = self.publication_year {
            if !(MIN_PUBLICATION_YEAR..=MAX_PUBLICATION_YEAR).contains(&year) {
                return Err(ValidationError::YearOutOfRange(year));
            }
        }

        Ok(())
    }
}

fn required(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required(field));
    }
    Ok(())
}

fn max_len(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    let actual = value.chars().count();
    if actual > max {
        return Err(ValidationError::TooLong { field, max, actual });
    }
    Ok(())
}
