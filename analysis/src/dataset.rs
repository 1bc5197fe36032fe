pub mod pairing;


use crate::{
    config::ColumnLayout,
    database::{
        sqlite::{BenchmarkConnection, ResultTable},
        ConnectionError, Instance,
    },
};
use rusqlite::Connection;
use std::{collections::BTreeMap, path::Path};
use tracing::instrument;

/// All benchmark results of one database, loaded once and never mutated
#[derive(Debug, Clone)]
pub struct BenchmarkDataset {
    table: String,
    columns: Vec<String>,
    layout: ColumnLayout,
    instances: Vec<Instance>,
}

impl BenchmarkDataset {
    /// open `path`, load every instance and release the connection again
    #[instrument(skip(layout), level = "info")]
    pub fn load(path: &Path, layout: &ColumnLayout) -> Result<Self, ConnectionError> {
        let connection = BenchmarkConnection::open(path)?;
        let dataset = Self::from_connection(connection.connection(), layout)?;
        connection.close()?;

        Ok(dataset)
    }

    pub fn from_connection(
        connection: &Connection,
        layout: &ColumnLayout,
    ) -> Result<Self, ConnectionError> {
        let table = ResultTable::detect(connection)?;
        let instances = table.fetch_all(layout)?;

        Ok(Self {
            table: table.name().to_owned(),
            columns: table.columns().to_vec(),
            layout: layout.clone(),
            instances,
        })
    }

    /// build a dataset from already typed instances, e.g. for tests
    pub fn from_instances(layout: &ColumnLayout, instances: Vec<Instance>) -> Self {
        Self {
            table: String::new(),
            columns: Vec::new(),
            layout: layout.clone(),
            instances,
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn layout(&self) -> &ColumnLayout {
        &self.layout
    }

    pub fn instances(&self) -> &[Instance] {
        &self.instances
    }

    /// number of constraint flags in every configuration key
    pub fn width(&self) -> usize {
        self.layout.width()
    }

    /// column ordinal -> column name, in declaration order
    pub fn list_columns(&self) -> BTreeMap<usize, String> {
        self.columns.iter().cloned().enumerate().collect()
    }

    /// Columns between the satisfiability column and the trailing solver
    /// measurements, re-indexed from 0. This is a positional guess at the
    /// constraint names and not checked against the layout's flag range.
    pub fn list_constraints(&self) -> BTreeMap<usize, String> {
        let start = self.layout.is_sat + 1;
        let end = self
            .columns
            .len()
            .saturating_sub(self.layout.solver_columns());

        self.columns
            .get(start..end.max(start))
            .unwrap_or_default()
            .iter()
            .cloned()
            .enumerate()
            .collect()
    }
}
