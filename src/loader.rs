use crate::{
    error::LoaderError,
    journal::JournalRecord,
    warehouse::{TableRef, Warehouse, WriteDisposition, JOURNAL_SCHEMA},
};

/// Overwrite the table with the records and return the row count the warehouse reports.
/// The count is read back from the table rather than taken from `records`.
pub async fn load_journals<W: Warehouse>(
    warehouse: &mut W,
    table: &TableRef,
    records: &[JournalRecord],
) -> Result<u64, LoaderError> {
    warehouse
        .load_table(table, &JOURNAL_SCHEMA, records, WriteDisposition::WriteTruncate)
        .await?;

    let num_rows = warehouse.num_rows(table).await?;
    tracing::info!("Loaded {num_rows} rows into {table}");

    Ok(num_rows)
}

#[cfg(test)]
mod tests {
    use super::load_journals;
    use crate::{
        journal::JournalRecord,
        warehouse::{
            memory::{Call, MemoryWarehouse},
            TableRef, JOURNAL_SCHEMA,
        },
    };

    #[tokio::test]
    async fn overwrites_rows() {
        let table = TableRef::new("p", "d", "t");
        let mut warehouse = MemoryWarehouse::new().with_table(
            table.clone(),
            JOURNAL_SCHEMA.to_vec(),
            vec![JournalRecord::new("Stale", 1.0), JournalRecord::new("Older", 2.0)],
        );
        let records = vec![JournalRecord::new("Cell", 14.1)];

        let rows = load_journals(&mut warehouse, &table, &records)
            .await
            .expect("Failed to load");

        assert_eq!(rows, 1);
        assert_eq!(warehouse.tables[&table].rows, records);
        assert_eq!(
            warehouse.calls,
            vec![Call::Load(table.clone()), Call::NumRows(table)]
        );
    }

    #[tokio::test]
    async fn empty_load() {
        let table = TableRef::new("p", "d", "t");
        let mut warehouse = MemoryWarehouse::new();

        let rows = load_journals(&mut warehouse, &table, &[])
            .await
            .expect("Failed to load");
        assert_eq!(rows, 0);
    }
}
