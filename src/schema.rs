use crate::{
    error::LoaderError,
    warehouse::{TableRef, Warehouse, JOURNAL_SCHEMA},
};

/// Drop any table at `table` and create an empty one with the journal schema.
///
/// A failed delete is never surfaced: a table that does not exist yet is the
/// common case and is not told apart from other delete failures.
/// A failed create is fatal.
pub async fn recreate_table<W: Warehouse>(
    warehouse: &mut W,
    table: &TableRef,
) -> Result<(), LoaderError> {
    match warehouse.delete_table(table).await {
        Ok(()) => tracing::info!("Deleted existing table {table}"),
        Err(err) => tracing::debug!("Ignoring delete failure for {table}: {err}"),
    }

    warehouse.create_table(table, &JOURNAL_SCHEMA).await?;
    tracing::info!("Created table {table}");

    Ok(())
}
