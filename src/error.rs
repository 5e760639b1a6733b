use std::{error, fmt, io, path::PathBuf};

#[derive(Debug)]
pub enum LoaderError {
    /// The source CSV file does not exist.
    MissingFile(PathBuf),

    /// The CSV header lacks a column the extractor maps by name.
    MissingColumn(&'static str),

    /// A failure while reading or decoding the CSV file.
    ParseError(csv::Error),

    /// IO error occured while reading the source file.
    IoError(io::Error),

    /// A JSON payload could not be encoded or a response could not be decoded.
    JsonError(serde_json::Error),

    /// The HTTP request to the warehouse failed before a response arrived.
    HttpError(reqwest::Error),

    /// The warehouse answered with a non-success status.
    Remote { status: u16, message: String },

    /// A load job reached its terminal state with an error.
    Job { job_id: String, message: String },

    /// A warehouse response was missing a field the loader relies on.
    MalformedResponse(&'static str),
}

impl LoaderError {
    /// Construct a Remote error.
    pub fn remote(status: u16, message: impl Into<String>) -> Self {
        LoaderError::Remote {
            status,
            message: message.into(),
        }
    }

    /// Construct a Job error.
    pub fn job(job_id: impl Into<String>, message: impl Into<String>) -> Self {
        LoaderError::Job {
            job_id: job_id.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for LoaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoaderError::MissingFile(path) => {
                write!(f, "CSV file '{}' not found", path.display())
            }
            LoaderError::MissingColumn(name) => {
                write!(f, "CSV header is missing the '{name}' column")
            }
            LoaderError::ParseError(err) => write!(f, "parse error: {err}"),
            LoaderError::IoError(err) => write!(f, "io error: {err}"),
            LoaderError::JsonError(err) => write!(f, "json error: {err}"),
            LoaderError::HttpError(err) => write!(f, "http error: {err}"),
            LoaderError::Remote { status, message } => {
                write!(f, "warehouse returned status {status}: {message}")
            }
            LoaderError::Job { job_id, message } => {
                write!(f, "load job {job_id} failed: {message}")
            }
            LoaderError::MalformedResponse(field) => {
                write!(f, "warehouse response is missing '{field}'")
            }
        }
    }
}

impl From<io::Error> for LoaderError {
    fn from(error: io::Error) -> Self {
        LoaderError::IoError(error)
    }
}

impl From<csv::Error> for LoaderError {
    fn from(error: csv::Error) -> Self {
        LoaderError::ParseError(error)
    }
}

impl From<serde_json::Error> for LoaderError {
    fn from(error: serde_json::Error) -> Self {
        LoaderError::JsonError(error)
    }
}

impl From<reqwest::Error> for LoaderError {
    fn from(error: reqwest::Error) -> Self {
        LoaderError::HttpError(error)
    }
}

impl error::Error for LoaderError {}

#[cfg(test)]
mod tests {
    use super::LoaderError;
    use std::path::PathBuf;

    #[test]
    fn missing_file_message() {
        let err = LoaderError::MissingFile(PathBuf::from("scimagojr_2024.csv"));
        assert_eq!(err.to_string(), "CSV file 'scimagojr_2024.csv' not found");
    }

    #[test]
    fn job_message() {
        let err = LoaderError::job("job_123", "Invalid schema");
        assert_eq!(err.to_string(), "load job job_123 failed: Invalid schema");
    }
}
