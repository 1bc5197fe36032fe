use super::{
    row::{map_problem, map_result},
    util::quote_identifier,
    ConnectionError, Instance, ID,
};
use crate::config::{ColumnLayout, MAX_CONSTRAINTS};
use rusqlite::{params, Connection, OpenFlags, OptionalExtension};
use std::path::Path;
use tracing::{debug, error, info, warn};

#[derive(Debug)]
/// Read-only connection to a benchmark result database
pub struct BenchmarkConnection {
    connection: Connection,
}

impl BenchmarkConnection {
    pub fn open(path: &Path) -> Result<Self, ConnectionError> {
        let connection = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|error| {
            error!(path = ?path, "Failed to open SQLite database: {error}");
            error
        })?;

        info!(path = ?path, "Opened SQLite database");

        Ok(Self { connection })
    }

    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    pub fn close(mut self) -> Result<(), ConnectionError> {
        let mut counter = 0;
        while let Err((connection, error)) = self.connection.close() {
            counter += 1;
            self.connection = connection;
            error!(error = ?error, "Failed to close SQLite connection: {error}, trying again {counter}/3");

            if counter == 3 {
                error!("Failed to close connection, giving up");

                return Err(ConnectionError::SQLite(error));
            }
        }

        info!("Closed SQLite connection");

        Ok(())
    }
}

#[derive(Debug)]
/// The one user defined table of a benchmark database with its declared columns
pub struct ResultTable<'c> {
    connection: &'c Connection,
    name: String,
    columns: Vec<String>,
}

impl<'c> ResultTable<'c> {
    /// locate the first table or view that isn't part of SQLite's own schema
    pub fn detect(connection: &'c Connection) -> Result<Self, ConnectionError> {
        let name: String = connection
            .prepare_cached(
                "select name from sqlite_master
                 where type in ('table', 'view') and name not like 'sqlite_%'",
            )?
            .query_row([], |row| row.get(0))
            .optional()?
            .ok_or(ConnectionError::SchemaNotFound)?;

        let columns = connection
            .prepare_cached("select name from pragma_table_info(?) order by cid")?
            .query_map(params![name.as_str()], |row| row.get(0))?
            .try_fold(Vec::new(), |mut init, result| {
                init.push(result?);

                Ok::<Vec<String>, ConnectionError>(init)
            })?;

        if columns.is_empty() {
            error!(table = %name, "Table declares no columns");

            return Err(ConnectionError::SchemaNotFound);
        }

        debug!(table = %name, columns = columns.len(), "Detected result table");

        Ok(Self {
            connection,
            name,
            columns,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// column names in declaration order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// fail fast if the layout points past the declared columns
    pub fn check_layout(&self, layout: &ColumnLayout) -> Result<(), ConnectionError> {
        if layout.width() > MAX_CONSTRAINTS {
            return Err(ConnectionError::TooManyConstraints(layout.width()));
        }

        let required = layout.required_columns();
        if self.columns.len() < required {
            error!(
                table = %self.name,
                columns = self.columns.len(),
                required = required,
                "Layout does not match table schema"
            );

            return Err(ConnectionError::SchemaMismatch {
                columns: self.columns.len(),
                required,
            });
        }

        Ok(())
    }

    fn instance_column(&self, layout: &ColumnLayout) -> String {
        quote_identifier(&self.columns[layout.instance_id])
    }

    /// highest instance id, `None` for an empty table
    pub fn max_instance(&self, layout: &ColumnLayout) -> Result<Option<ID>, ConnectionError> {
        let query = format!(
            "select max({}) from {}",
            self.instance_column(layout),
            quote_identifier(&self.name)
        );

        Ok(self
            .connection
            .prepare_cached(&query)?
            .query_row([], |row| row.get(0))?)
    }

    /// fetch and map all rows of one instance
    pub fn fetch_instance(&self, id: ID, layout: &ColumnLayout) -> Result<Instance, ConnectionError> {
        let query = format!(
            "select * from {} where {} = ?",
            quote_identifier(&self.name),
            self.instance_column(layout)
        );

        let mut statement = self.connection.prepare_cached(&query)?;
        let mut rows = statement.query(params![id])?;
        let mut instance = Instance::empty(id);

        while let Some(row) = rows.next()? {
            if instance.problem.is_none() {
                instance.problem = Some(map_problem(row, layout, id)?);
            }

            let result = map_result(row, layout, id)?;
            if instance.results.insert(result.key, result.results).is_some() {
                debug!(instance = id, key = %result.key, "Duplicate configuration, keeping the later row");
            }
        }

        if instance.problem.is_none() {
            warn!(instance = id, "No rows found for instance, keeping it empty");
        }

        Ok(instance)
    }

    /// fetch every instance from 0 up to the highest id
    pub fn fetch_all(&self, layout: &ColumnLayout) -> Result<Vec<Instance>, ConnectionError> {
        self.check_layout(layout)?;

        let max = match self.max_instance(layout)? {
            Some(max) => max,
            None => {
                warn!(table = %self.name, "Table is empty");

                return Ok(Vec::new());
            }
        };

        let mut instances = Vec::with_capacity(instance_capacity(max));
        for id in 0..=max {
            instances.push(self.fetch_instance(id, layout)?);
        }

        let rows: usize = instances.iter().map(|instance| instance.results.len()).sum();
        info!(
            table = %self.name,
            instances = instances.len(),
            configurations = rows,
            "Loaded benchmark results"
        );

        Ok(instances)
    }
}

/// number of instances in `0..=max`, zero when that does not fit in memory
pub(crate) fn instance_capacity(max: ID) -> usize {
    usize::try_from(max).map_or(0, |max| max.saturating_add(1))
}
