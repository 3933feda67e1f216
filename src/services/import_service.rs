use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use encoding_rs::Encoding;
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::database::CandidateRepository;
use crate::error::{Error, Result};
use crate::models::candidate::{AuditStamp, CandidateFields};
use crate::utils::time::now;

/// Positional columns every import row must carry: username, city, phone,
/// bachelor_school, major, degree, test_score_of_general_ability, paper_score.
pub const IMPORT_COLUMNS: usize = 8;

pub const IMPORT_DELIMITER: u8 = b';';

#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// WHATWG encoding label of the source file.
    pub encoding: String,
    /// The first row is data unless this is set.
    pub skip_header: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            encoding: "gbk".to_string(),
            skip_header: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub imported: usize,
    pub skipped_header: bool,
    pub candidate_ids: Vec<i64>,
}

#[derive(Clone)]
pub struct ImportService {
    candidates: Arc<dyn CandidateRepository>,
}

impl ImportService {
    pub fn new(candidates: Arc<dyn CandidateRepository>) -> Self {
        Self { candidates }
    }

    pub async fn import_file(&self, path: &Path, options: &ImportOptions) -> Result<ImportReport> {
        let bytes = tokio::fs::read(path).await?;
        let text = decode(&bytes, &options.encoding)?;
        info!(path = %path.display(), encoding = %options.encoding, "Importing candidates");
        self.import_text(&text, options.skip_header).await
    }

    /// Stores one candidate per row, committing each as it goes. The first
    /// short row aborts the run; rows stored before it stay stored. A blank
    /// line counts as a row with no fields.
    pub async fn import_text(&self, text: &str, skip_header: bool) -> Result<ImportReport> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(IMPORT_DELIMITER)
            .has_headers(false)
            .flexible(true)
            .from_reader(text.as_bytes());

        let mut report = ImportReport::default();
        // line where the next row must start; the csv reader skips blank lines
        let mut next_line: u64 = 1;
        for (index, record) in reader.records().enumerate() {
            let record = record?;
            let line = record.position().map(|p| p.line()).unwrap_or(next_line);
            if line > next_line {
                return Err(empty_row(next_line));
            }
            next_line = line + lines_spanned(&record);

            if index == 0 && skip_header {
                report.skipped_header = true;
                continue;
            }
            let fields = row_to_fields(&record, line)?;
            let candidate = self
                .candidates
                .insert(&fields, &AuditStamp::anonymous(now()))
                .await?;
            info!(id = candidate.id, username = %candidate.fields.username, "Imported candidate");
            report.imported += 1;
            report.candidate_ids.push(candidate.id);
        }

        if text.lines().count() as u64 >= next_line {
            return Err(empty_row(next_line));
        }

        info!(imported = report.imported, "Candidate import finished");
        Ok(report)
    }
}

fn empty_row(line: u64) -> Error {
    Error::MalformedRow {
        line,
        found: 0,
        expected: IMPORT_COLUMNS,
    }
}

/// Physical lines a record covers, counting newlines inside quoted fields.
fn lines_spanned(record: &csv::StringRecord) -> u64 {
    1 + record.iter().map(|field| field.matches('\n').count() as u64).sum::<u64>()
}

/// Decodes the whole file up front so a bad byte fails the run before any
/// row is written.
pub fn decode(bytes: &[u8], label: &str) -> Result<String> {
    let encoding = Encoding::for_label(label.trim().as_bytes())
        .ok_or_else(|| Error::Encoding(format!("unknown encoding label '{}'", label)))?;
    let (text, used, had_errors) = encoding.decode(bytes);
    if had_errors {
        return Err(Error::Encoding(format!(
            "input is not valid {}",
            used.name()
        )));
    }
    Ok(text.into_owned())
}

fn row_to_fields(record: &csv::StringRecord, line: u64) -> Result<CandidateFields> {
    if record.len() < IMPORT_COLUMNS {
        return Err(Error::MalformedRow {
            line,
            found: record.len(),
            expected: IMPORT_COLUMNS,
        });
    }

    Ok(CandidateFields {
        username: record[0].to_string(),
        city: record[1].to_string(),
        phone: record[2].to_string(),
        bachelor_school: record[3].to_string(),
        major: record[4].to_string(),
        degree: record[5].to_string(),
        test_score_of_general_ability: parse_score(&record[6], "test_score_of_general_ability", line),
        paper_score: parse_score(&record[7], "paper_score", line),
        ..Default::default()
    })
}

fn parse_score(cell: &str, column: &str, line: u64) -> Option<Decimal> {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return None;
    }
    match Decimal::from_str(trimmed) {
        Ok(score) => Some(score),
        Err(_) => {
            warn!(line, column, value = trimmed, "Score is not a number, leaving it blank");
            None
        }
    }
}
