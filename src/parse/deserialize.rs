use crate::{error::LoaderError, journal::JournalRecord};
use serde::Deserialize;
use std::{fs::File, io, io::BufReader, path::Path};

const TITLE: &str = "Title";
const SJR: &str = "SJR";

/// The representation of a row in the SCImago export.
/// Only the two columns the loader keeps are mapped, the rest are ignored.
#[derive(Debug, Deserialize)]
struct ScimagoRecord {
    #[serde(rename = "Title")]
    title: String,
    #[serde(rename = "SJR")]
    sjr: String,
}

impl ScimagoRecord {
    /// Consumes the `ScimagoRecord` and normalizes it into a `JournalRecord`.
    /// An unparseable score is logged and replaced with `0.0`.
    fn normalize(self) -> JournalRecord {
        let title = self.title.trim();
        let raw = self.sjr.trim();

        let sjr = parse_sjr(raw).unwrap_or_else(|| {
            tracing::warn!("Could not parse SJR value '{raw}' for journal '{title}'");
            0.0
        });

        JournalRecord::new(title, sjr)
    }
}

/// Parse an already trimmed score written with a comma as the decimal separator.
/// Returns `None` for anything that is not a finite number.
fn parse_sjr(raw: &str) -> Option<f64> {
    raw.replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|sjr| sjr.is_finite())
}

/// Build a reader for the semicolon delimited export.
fn reader<R: io::Read>(rdr: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(true)
        .flexible(true)
        .from_reader(rdr)
}

/// Read every row from the reader, in source order.
fn read_records<R: io::Read>(rdr: &mut csv::Reader<R>) -> Result<Vec<JournalRecord>, LoaderError> {
    let headers = rdr.headers()?;
    for column in [TITLE, SJR] {
        if !headers.iter().any(|header| header == column) {
            return Err(LoaderError::MissingColumn(column));
        }
    }

    let mut records = Vec::new();
    for result in rdr.deserialize() {
        let record: ScimagoRecord = result?;
        records.push(record.normalize());
    }

    Ok(records)
}

/// Load and normalize the journal records from the specified file path.
pub fn extract(path: &Path) -> Result<Vec<JournalRecord>, LoaderError> {
    if !path.exists() {
        return Err(LoaderError::MissingFile(path.to_path_buf()));
    }

    let f = File::open(path)?;
    let mut rdr = reader(BufReader::new(f));
    read_records(&mut rdr)
}

/// Render the first `n` records on a single line.
pub fn sample(records: &[JournalRecord], n: usize) -> String {
    records
        .iter()
        .take(n)
        .map(JournalRecord::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
