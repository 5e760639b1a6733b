use super::{Field, TableRef, Warehouse, WriteDisposition};
use crate::{error::LoaderError, journal::JournalRecord};
use std::collections::HashMap;

/// A stored table: its schema and rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub schema: Vec<Field>,
    pub rows: Vec<JournalRecord>,
}

/// A warehouse operation, recorded in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Delete(TableRef),
    Create(TableRef),
    Load(TableRef),
    NumRows(TableRef),
}

/// In-memory `Warehouse` tracking tables by reference and every call made to it.
#[derive(Debug, Default)]
pub struct MemoryWarehouse {
    pub tables: HashMap<TableRef, Table>,
    pub calls: Vec<Call>,
    /// Refuse table deletion, mimicking a permission or server failure.
    pub reject_delete: bool,
    /// Refuse table creation, mimicking a missing dataset or permission.
    pub reject_create: bool,
}

impl MemoryWarehouse {
    pub fn new() -> Self {
        MemoryWarehouse::default()
    }

    /// Seed a table with arbitrary contents.
    pub fn with_table(mut self, table: TableRef, schema: Vec<Field>, rows: Vec<JournalRecord>) -> Self {
        self.tables.insert(table, Table { schema, rows });
        self
    }
}

impl Warehouse for MemoryWarehouse {
    async fn delete_table(&mut self, table: &TableRef) -> Result<(), LoaderError> {
        self.calls.push(Call::Delete(table.clone()));
        if self.reject_delete {
            return Err(LoaderError::remote(500, "Backend Error"));
        }
        match self.tables.remove(table) {
            Some(_) => Ok(()),
            None => Err(LoaderError::remote(404, format!("Not found: Table {table}"))),
        }
    }

    async fn create_table(&mut self, table: &TableRef, schema: &[Field]) -> Result<(), LoaderError> {
        self.calls.push(Call::Create(table.clone()));
        if self.reject_create {
            return Err(LoaderError::remote(403, "Access Denied"));
        }
        if self.tables.contains_key(table) {
            return Err(LoaderError::remote(409, format!("Already Exists: Table {table}")));
        }

        let created = Table {
            schema: schema.to_vec(),
            rows: Vec::new(),
        };
        self.tables.insert(table.clone(), created);
        Ok(())
    }

    async fn load_table(
        &mut self,
        table: &TableRef,
        schema: &[Field],
        records: &[JournalRecord],
        disposition: WriteDisposition,
    ) -> Result<(), LoaderError> {
        self.calls.push(Call::Load(table.clone()));
        match disposition {
            WriteDisposition::WriteTruncate => {
                let loaded = Table {
                    schema: schema.to_vec(),
                    rows: records.to_vec(),
                };
                self.tables.insert(table.clone(), loaded);
            }
        }
        Ok(())
    }

    async fn num_rows(&mut self, table: &TableRef) -> Result<u64, LoaderError> {
        self.calls.push(Call::NumRows(table.clone()));
        self.tables
            .get(table)
            .map(|t| t.rows.len() as u64)
            .ok_or_else(|| LoaderError::remote(404, format!("Not found: Table {table}")))
    }
}
