//! Records - the catalog entity and its caller-supplied candidate form.
//!
//! A `Record` is what the store owns: it carries the store-assigned `id` and
//! the `created_at` / `updated_at` timestamps. A `RecordDraft` is everything a
//! caller may supply; the store turns drafts into records on create and
//! update.

mod validation;

use std::time::SystemTime;

use serde::{Deserialize, Serialize};

pub use validation::{
    ValidationError, MAX_AUTHOR_LEN, MAX_CATEGORY_LEN, MAX_DESCRIPTION_LEN,
    MAX_EXTERNAL_CODE_LEN, MAX_PUBLICATION_YEAR, MAX_TITLE_LEN, MIN_PUBLICATION_YEAR,
};

/// A catalog entry as stored and returned by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub id: u64,
    pub title: String,
    pub author: String,
    #[serde(alias = "genre")]
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub publication_year: Option<i32>,
    #[serde(default, alias = "isbn")]
    pub external_code: String,
    pub created_at: SystemTime,
    #[serde(default)]
    pub updated_at: Option<SystemTime>,
}

impl Record {
    /// Build a freshly created record from a draft.
    pub(crate) fn from_draft(id: u64, draft: RecordDraft, created_at: SystemTime) -> Self {
        Self {
            id,
            title: draft.title,
            author: draft.author,
            category: draft.category,
            description: draft.description,
            publication_year: draft.publication_year,
            external_code: draft.external_code,
            created_at,
            updated_at: None,
        }
    }

    /// Replace every caller-owned field with the draft's values.
    ///
    /// `id` and `created_at` are kept; `updated_at` is set to `now`.
    pub(crate) fn revised(&self, draft: RecordDraft, now: SystemTime) -> Self {
        Self {
            updated_at: Some(now),
            ..Record::from_draft(self.id, draft, self.created_at)
        }
    }

    /// The caller-owned fields of this record as a draft.
    pub fn to_draft(&self) -> RecordDraft {
        RecordDraft {
            title: self.title.clone(),
            author: self.author.clone(),
            category: self.category.clone(),
            description: self.description.clone(),
            publication_year: self.publication_year,
            external_code: self.external_code.clone(),
        }
    }
}

/// Caller-supplied candidate for create and update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordDraft {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default, alias = "genre")]
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub publication_year: Option<i32>,
    #[serde(default, alias = "isbn")]
    pub external_code: String,
}

impl RecordDraft {
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            category: category.into(),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_publication_year(mut self, year: i32) -> Self {
        self.publication_year = Some(year);
        self
    }

    pub fn with_external_code(mut self, code: impl Into<String>) -> Self {
        self.external_code = code.into();
        self
    }
}
