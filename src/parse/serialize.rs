use crate::{error::LoaderError, journal::JournalRecord};
use std::io::Write;

/// Serialize the records as newline delimited JSON, one object per line.
pub fn to_ndjson(records: &[JournalRecord]) -> Result<Vec<u8>, LoaderError> {
    let mut buf = Vec::new();

    for record in records {
        serde_json::to_writer(&mut buf, record)?;
        buf.write_all(b"\n")?;
    }

    Ok(buf)
}
