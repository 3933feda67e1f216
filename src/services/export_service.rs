use chrono::{DateTime, Local};
use tracing::info;

use crate::error::{Error, Result};
use crate::models::candidate::{label_for, Candidate};
use crate::utils::time::file_timestamp;

/// Columns of the candidate CSV export, in order.
pub const EXPORTABLE_FIELDS: [&str; 12] = [
    "username",
    "city",
    "phone",
    "bachelor_school",
    "master_school",
    "degree",
    "first_result",
    "first_interviewer",
    "second_result",
    "second_interviewer",
    "hr_result",
    "hr_interviewer",
];

/// Lets spreadsheet tools detect UTF-8 and show the localized headers.
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

pub struct CsvExport {
    pub filename: String,
    pub body: Vec<u8>,
}

pub struct ExportService;

impl ExportService {
    pub fn filename(at: DateTime<Local>) -> String {
        format!("recruitment-candidates-list-{}.csv", file_timestamp(at))
    }

    /// BOM, a header of display labels, then one row per candidate in the
    /// order given.
    pub fn candidates_csv(candidates: &[Candidate]) -> Result<Vec<u8>> {
        let mut writer = csv::WriterBuilder::new()
            .terminator(csv::Terminator::CRLF)
            .from_writer(UTF8_BOM.to_vec());

        let header = EXPORTABLE_FIELDS
            .iter()
            .map(|field| label_for(field))
            .collect::<Result<Vec<_>>>()?;
        writer.write_record(&header)?;

        for candidate in candidates {
            let row = EXPORTABLE_FIELDS
                .iter()
                .map(|field| candidate.display_value(field))
                .collect::<Result<Vec<_>>>()?;
            writer.write_record(&row)?;
        }

        writer.into_inner().map_err(|e| Error::Io(e.into_error()))
    }

    pub fn export(
        candidates: &[Candidate],
        acting_user: &str,
        at: DateTime<Local>,
    ) -> Result<CsvExport> {
        let body = Self::candidates_csv(candidates)?;
        info!(
            target: "audit",
            user = acting_user,
            count = candidates.len(),
            "{} exported {} candidate records",
            acting_user,
            candidates.len()
        );
        Ok(CsvExport {
            filename: Self::filename(at),
            body,
        })
    }
}
