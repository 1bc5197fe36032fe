//! Mapping of untyped result rows into typed records using a `ColumnLayout`

use super::{ConnectionError, ConstraintKey, Measurement, Problem, Satisfiability, SolverResults, ID};
use crate::config::ColumnLayout;
use rusqlite::{types::ValueRef, Row};

/// One result row: the configuration key and the measurements of every solver
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRow {
    pub key: ConstraintKey,
    pub results: SolverResults,
}

fn malformed(instance: ID, column: usize, reason: impl Into<String>) -> ConnectionError {
    ConnectionError::MalformedRow {
        instance,
        column,
        reason: reason.into(),
    }
}

fn type_name(value: ValueRef<'_>) -> &'static str {
    match value {
        ValueRef::Null => "null",
        ValueRef::Integer(_) => "integer",
        ValueRef::Real(_) => "real",
        ValueRef::Text(_) => "text",
        ValueRef::Blob(_) => "blob",
    }
}

/// interpret a column as a constraint flag, integers are truthy when non-zero
pub fn as_flag(value: ValueRef<'_>, instance: ID, column: usize) -> Result<bool, ConnectionError> {
    match value {
        ValueRef::Integer(value) => Ok(value != 0),
        ValueRef::Real(value) => Ok(value != 0.0),
        ValueRef::Text(text) => match String::from_utf8_lossy(text).trim().to_lowercase().as_str() {
            "1" | "t" | "true" => Ok(true),
            "0" | "f" | "false" => Ok(false),
            other => Err(malformed(
                instance,
                column,
                format!("'{other}' is not a constraint flag"),
            )),
        },
        other => Err(malformed(
            instance,
            column,
            format!("expected a constraint flag, found {}", type_name(other)),
        )),
    }
}

pub fn as_number(value: ValueRef<'_>, instance: ID, column: usize) -> Result<f64, ConnectionError> {
    match value {
        ValueRef::Integer(value) => Ok(value as f64),
        ValueRef::Real(value) => Ok(value),
        ValueRef::Text(text) => {
            let text = String::from_utf8_lossy(text);

            text.trim()
                .parse()
                .map_err(|_| malformed(instance, column, format!("'{text}' is not a number")))
        }
        other => Err(malformed(
            instance,
            column,
            format!("expected a measurement, found {}", type_name(other)),
        )),
    }
}

/// lossless text rendering for metadata columns
pub fn as_text(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => String::new(),
        ValueRef::Integer(value) => value.to_string(),
        ValueRef::Real(value) => value.to_string(),
        ValueRef::Text(text) | ValueRef::Blob(text) => String::from_utf8_lossy(text).into_owned(),
    }
}

pub fn as_satisfiability(
    value: ValueRef<'_>,
    instance: ID,
    column: usize,
) -> Result<Satisfiability, ConnectionError> {
    match value {
        ValueRef::Null => Ok(Satisfiability::Unknown),
        ValueRef::Integer(0) => Ok(Satisfiability::Unsatisfiable),
        ValueRef::Integer(_) => Ok(Satisfiability::Satisfiable),
        ValueRef::Text(text) => match String::from_utf8_lossy(text).trim().to_lowercase().as_str() {
            "sat" | "true" | "1" => Ok(Satisfiability::Satisfiable),
            "unsat" | "false" | "0" => Ok(Satisfiability::Unsatisfiable),
            "unknown" | "" => Ok(Satisfiability::Unknown),
            other => Err(malformed(
                instance,
                column,
                format!("'{other}' is not a satisfiability value"),
            )),
        },
        other => Err(malformed(
            instance,
            column,
            format!("expected a satisfiability flag, found {}", type_name(other)),
        )),
    }
}

pub fn map_result(row: &Row<'_>, layout: &ColumnLayout, instance: ID) -> Result<ResultRow, ConnectionError> {
    let flags = layout
        .flags
        .iter()
        .map(|column| -> Result<bool, ConnectionError> { as_flag(row.get_ref(column)?, instance, column) })
        .collect::<Result<Vec<_>, _>>()?;

    let mut results = SolverResults::new();
    for solver in layout.solvers.iter() {
        let mut values = [0.0; 3];
        for (position, value) in values.iter_mut().enumerate() {
            let column = solver.offset + position;
            *value = as_number(row.get_ref(column)?, instance, column)?;
        }
        let [generation, solve, other] = values;

        results.insert(solver.name.clone(), Measurement::new(generation, solve, other));
    }

    Ok(ResultRow {
        key: ConstraintKey::from_flags(&flags),
        results,
    })
}

pub fn map_problem(row: &Row<'_>, layout: &ColumnLayout, instance: ID) -> Result<Problem, ConnectionError> {
    let grid = layout
        .grid
        .iter()
        .map(|column| -> Result<String, ConnectionError> { Ok(as_text(row.get_ref(column)?)) })
        .collect::<Result<Vec<_>, _>>()?;

    let index = match layout.index {
        Some(column) => Some(
            as_text(row.get_ref(column)?)
                .split(", ")
                .map(str::to_owned)
                .collect(),
        ),
        None => None,
    };

    let debug = layout
        .debug
        .iter()
        .map(|column| -> Result<String, ConnectionError> { Ok(as_text(row.get_ref(*column)?)) })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Problem {
        grid,
        index,
        debug,
        satisfiability: as_satisfiability(row.get_ref(layout.is_sat)?, instance, layout.is_sat)?,
    })
}
