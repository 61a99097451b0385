//! Bulk Importer - load records from comma-separated text.
//!
//! The first non-blank line is a header naming the columns. `Title`,
//! `Author` and `Category` (or `Genre`) are required; `Description`,
//! `PublicationYear` (or `Year`) and `ExternalCode` (or `ISBN`) are optional
//! and may be missing from the header or from individual rows.
//!
//! Each row is created independently. A bad row is counted in
//! [`ImportSummary::failed`] and the import moves on. A stream that cannot be
//! read at all aborts with [`ImportError::Stream`], keeping every row created
//! before the abort.

pub mod csv;

use std::collections::VecDeque;
use std::fmt;
use std::io::BufRead;

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::CatalogError;
use crate::record::{Record, RecordDraft, ValidationError};
use crate::store::RecordStore;
use self::csv::{parse_csv_line, CsvLineError, CsvOptions};

/// Counts of created and rejected rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub succeeded: usize,
    pub failed: usize,
}

/// Import failures that abort the whole batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportError {
    /// The input holds no header line.
    MissingHeader,
    /// The header line is not valid CSV.
    MalformedHeader(CsvLineError),
    /// A required column is absent from the header.
    MissingColumn(&'static str),
    /// Reading the input failed part-way through.
    Stream {
        line: usize,
        message: String,
        committed: ImportSummary,
    },
}

impl ImportError {
    /// Rows already created when the import aborted.
    pub fn committed(&self) -> ImportSummary {
        match self {
            ImportError::Stream { committed, .. } => *committed,
            _ => ImportSummary::default(),
        }
    }
}

impl fmt::Display for ImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportError::MissingHeader => write!(f, "input has no header row"),
            ImportError::MalformedHeader(err) => write!(f, "malformed header: {}", err),
            ImportError::MissingColumn(column) => {
                write!(f, "header is missing required column {}", column)
            }
            ImportError::Stream {
                line,
                message,
                committed,
            } => write!(
                f,
                "read error at line {}: {} ({} rows imported, {} failed before abort)",
                line, message, committed.succeeded, committed.failed
            ),
        }
    }
}

impl std::error::Error for ImportError {}

/// Why a single row was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowError {
    Malformed(CsvLineError),
    InvalidYear(String),
    Invalid(ValidationError),
    Store(CatalogError),
}

impl fmt::Display for RowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowError::Malformed(err) => write!(f, "malformed row: {}", err),
            RowError::InvalidYear(raw) => write!(f, "invalid publication year {:?}", raw),
            RowError::Invalid(err) => write!(f, "{}", err),
            RowError::Store(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for RowError {}

/// Column positions resolved from the header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportHeader {
    title: usize,
    author: usize,
    category: usize,
    description: Option<usize>,
    publication_year: Option<usize>,
    external_code: Option<usize>,
}

impl ImportHeader {
    /// Resolve column positions. Names match case-insensitively, ignoring
    /// spaces, underscores and hyphens.
    pub fn from_fields(fields: &[String]) -> Result<Self, ImportError> {
        let names: Vec<String> = fields.iter().map(|name| column_key(name)).collect();

        Ok(Self {
            title: position(&names, &["title"]).ok_or(ImportError::MissingColumn("Title"))?,
            author: position(&names, &["author"]).ok_or(ImportError::MissingColumn("Author"))?,
            category: position(&names, &["category", "genre"])
                .ok_or(ImportError::MissingColumn("Category"))?,
            description: position(&names, &["description"]),
            publication_year: position(&names, &["publicationyear", "year"]),
            external_code: position(&names, &["externalcode", "isbn"]),
        })
    }

    /// Build a draft from one row. Columns past the end of a short row
    /// count as empty.
    pub fn draft(&self, fields: &[String]) -> Result<RecordDraft, RowError> {
        let value = |index: Option<usize>| {
            index
                .and_then(|i| fields.get(i))
                .map(|v| v.trim().to_string())
                .unwrap_or_default()
        };

        let raw_year = value(self.publication_year);
        let publication_year = if raw_year.is_empty() {
            None
        } else {
            Some(
                raw_year
                    .parse::<i32>()
                    .map_err(|_| RowError::InvalidYear(raw_year.clone()))?,
            )
        };

        Ok(RecordDraft {
            title: value(Some(self.title)),
            author: value(Some(self.author)),
            category: value(Some(self.category)),
            description: value(self.description),
            publication_year,
            external_code: value(self.external_code),
        })
    }
}

fn position(names: &[String], aliases: &[&str]) -> Option<usize> {
    names.iter().position(|name| aliases.contains(&name.as_str()))
}

fn column_key(name: &str) -> String {
    name.trim_start_matches('\u{feff}')
        .chars()
        .filter(|c| !matches!(c, ' ' | '_' | '-'))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Import every row of `reader` into `store`.
pub fn import<S, R>(store: &S, reader: R) -> Result<ImportSummary, ImportError>
where
    S: RecordStore + ?Sized,
    R: BufRead,
{
    import_with(reader, |draft| store.create(draft))
}

/// Import every row of `reader`, handing each validated draft to `create`.
///
/// A quoted field left open runs on into the following lines. If it never
/// closes, or the joined lines still fail to parse, only the first line is
/// rejected and the lines after it are read again as rows of their own.
pub fn import_with<R, F>(reader: R, mut create: F) -> Result<ImportSummary, ImportError>
where
    R: BufRead,
    F: FnMut(RecordDraft) -> Result<Record, CatalogError>,
{
    let opts = CsvOptions::default();
    let mut summary = ImportSummary::default();
    let mut lines = reader.lines();
    let mut line_num = 0usize;

    let header = loop {
        line_num += 1;
        match lines.next() {
            None => return Err(ImportError::MissingHeader),
            Some(Err(err)) => {
                return Err(ImportError::Stream {
                    line: line_num,
                    message: err.to_string(),
                    committed: summary,
                })
            }
            Some(Ok(line)) if line.trim().is_empty() => continue,
            Some(Ok(line)) => {
                let fields = parse_csv_line(&line, &opts).map_err(ImportError::MalformedHeader)?;
                break ImportHeader::from_fields(&fields)?;
            }
        }
    };
    debug!(?header, "import header resolved");

    // Physical lines of the record being assembled, and lines to read again.
    let mut pending: Vec<(usize, String)> = Vec::new();
    let mut replay: VecDeque<(usize, String)> = VecDeque::new();

    loop {
        let (num, line) = match replay.pop_front() {
            Some(entry) => entry,
            None => match lines.next() {
                Some(line) => {
                    line_num += 1;
                    let line = line.map_err(|err| ImportError::Stream {
                        line: line_num,
                        message: err.to_string(),
                        committed: summary,
                    })?;
                    (line_num, line)
                }
                None if pending.is_empty() => break,
                None => {
                    reject_stranded(
                        &mut pending,
                        &mut replay,
                        &mut summary,
                        CsvLineError::UnclosedQuote,
                    );
                    continue;
                }
            },
        };

        if pending.is_empty() && line.trim().is_empty() {
            continue;
        }
        pending.push((num, line));

        let joined = pending
            .iter()
            .map(|(_, line)| line.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        let fields = match parse_csv_line(&joined, &opts) {
            Err(CsvLineError::UnclosedQuote) => continue,
            Err(err) if pending.len() > 1 => {
                reject_stranded(&mut pending, &mut replay, &mut summary, err);
                continue;
            }
            Err(err) => Err(RowError::Malformed(err)),
            Ok(fields) => Ok(fields),
        };
        let start = pending[0].0;
        pending.clear();

        match fields.and_then(|fields| create_row(&mut create, &header, &fields)) {
            Ok(id) => {
                summary.succeeded += 1;
                debug!(line = start, id, "row imported");
            }
            Err(err) => {
                summary.failed += 1;
                warn!(line = start, error = %err, "row rejected");
            }
        }
    }

    debug!(
        succeeded = summary.succeeded,
        failed = summary.failed,
        "import finished"
    );
    Ok(summary)
}

/// Reject the first line of a record whose quoting never resolved and queue
/// the lines after it ahead of anything already waiting.
fn reject_stranded(
    pending: &mut Vec<(usize, String)>,
    replay: &mut VecDeque<(usize, String)>,
    summary: &mut ImportSummary,
    err: CsvLineError,
) {
    let mut stranded = pending.drain(..);
    if let Some((line, _)) = stranded.next() {
        summary.failed += 1;
        warn!(line, error = %RowError::Malformed(err), "row rejected");
    }
    for entry in stranded.rev() {
        replay.push_front(entry);
    }
}

fn create_row<F>(create: &mut F, header: &ImportHeader, fields: &[String]) -> Result<u64, RowError>
where
    F: FnMut(RecordDraft) -> Result<Record, CatalogError>,
{
    let draft = header.draft(fields)?;
    draft.validate().map_err(RowError::Invalid)?;
    let record = create(draft).map_err(RowError::Store)?;
    Ok(record.id)
}
