pub mod bigquery;
#[cfg(test)]
pub mod memory;

use crate::{error::LoaderError, journal::JournalRecord};
use serde::Serialize;
use std::fmt;

/// Fully qualified identifier of a warehouse table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableRef {
    pub project_id: String,
    pub dataset_id: String,
    pub table_id: String,
}

impl TableRef {
    pub fn new(project_id: &str, dataset_id: &str, table_id: &str) -> Self {
        TableRef {
            project_id: project_id.to_owned(),
            dataset_id: dataset_id.to_owned(),
            table_id: table_id.to_owned(),
        }
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.project_id, self.dataset_id, self.table_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FieldType {
    String,
    Float64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FieldMode {
    Required,
}

/// A single column of a table schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Field {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub mode: FieldMode,
}

/// The fixed shape of the journal table.
pub const JOURNAL_SCHEMA: [Field; 2] = [
    Field {
        name: "title",
        field_type: FieldType::String,
        mode: FieldMode::Required,
    },
    Field {
        name: "sjr",
        field_type: FieldType::Float64,
        mode: FieldMode::Required,
    },
];

/// What a load job does with rows already present in the destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WriteDisposition {
    WriteTruncate,
}

/// The operations the loader needs from a columnar warehouse.
pub trait Warehouse {
    /// Delete the table, failing if it does not exist.
    async fn delete_table(&mut self, table: &TableRef) -> Result<(), LoaderError>;

    /// Create an empty table with the given schema.
    async fn create_table(&mut self, table: &TableRef, schema: &[Field]) -> Result<(), LoaderError>;

    /// Write the records into the table and block until the job is terminal.
    async fn load_table(
        &mut self,
        table: &TableRef,
        schema: &[Field],
        records: &[JournalRecord],
        disposition: WriteDisposition,
    ) -> Result<(), LoaderError>;

    /// Get the number of rows stored in the table.
    async fn num_rows(&mut self, table: &TableRef) -> Result<u64, LoaderError>;
}

#[cfg(test)]
mod tests {
    use super::{TableRef, WriteDisposition, JOURNAL_SCHEMA};

    #[test]
    fn table_display() {
        let table = TableRef::new("my-project", "journal_rank", "scimagojr_2024");
        assert_eq!(table.to_string(), "my-project.journal_rank.scimagojr_2024");
    }

    #[test]
    fn serialize_table() {
        let table = TableRef::new("p", "d", "t");
        let json = serde_json::to_string(&table).expect("Failed to serialize");
        assert_eq!(json, r#"{"projectId":"p","datasetId":"d","tableId":"t"}"#);
    }

    #[test]
    fn serialize_schema() {
        let json = serde_json::to_string(&JOURNAL_SCHEMA).expect("Failed to serialize");
        assert_eq!(
            json,
            r#"[{"name":"title","type":"STRING","mode":"REQUIRED"},{"name":"sjr","type":"FLOAT64","mode":"REQUIRED"}]"#
        );
    }

    #[test]
    fn serialize_disposition() {
        let json = serde_json::to_string(&WriteDisposition::WriteTruncate).expect("Failed to serialize");
        assert_eq!(json, r#""WRITE_TRUNCATE""#);
    }
}
