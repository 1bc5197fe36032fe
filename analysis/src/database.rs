pub mod row;
pub mod sqlite;
pub(crate) mod util;

#[cfg(test)]
mod sqlite_test;

use serde::{Serialize, Serializer};
use serde_repr::*;
use std::{collections::BTreeMap, fmt};
use thiserror::Error;

pub type ID = i64;

#[derive(Error, Debug)]
pub enum ConnectionError {
    #[error("SQLite error: {0}")]
    SQLite(#[from] rusqlite::Error),
    #[error("No user defined table or view found in the database")]
    SchemaNotFound,
    #[error("Table has {columns} columns, but the configured layout requires {required}")]
    SchemaMismatch { columns: usize, required: usize },
    #[error("Malformed row for instance {instance}, column {column}: {reason}")]
    MalformedRow {
        instance: ID,
        column: usize,
        reason: String,
    },
    #[error("Layout defines {0} constraint flags, which does not fit a constraint key")]
    TooManyConstraints(usize),
}

#[derive(Serialize_repr, Deserialize_repr, PartialEq, Eq, Debug, Clone, Copy)]
#[repr(i8)]
pub enum Satisfiability {
    Unsatisfiable = -1,
    Unknown = 0,
    Satisfiable = 1,
}

/// Puzzle metadata taken from the first row of an instance.
/// None of it is used for plotting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Problem {
    pub grid: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub debug: Vec<String>,
    pub satisfiability: Satisfiability,
}

/// The three measurements a solver reports for one configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Measurement {
    pub generation: f64,
    pub solve: f64,
    pub other: f64,
}

impl Measurement {
    pub fn new(generation: f64, solve: f64, other: f64) -> Self {
        Self {
            generation,
            solve,
            other,
        }
    }

    /// the value every comparison is based on
    pub fn primary(&self) -> f64 {
        self.generation
    }
}

pub type SolverResults = BTreeMap<String, Measurement>;

/// Fixed width tuple of constraint flags, bit `c` holds flag `c`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConstraintKey {
    bits: u32,
    width: u8,
}

impl ConstraintKey {
    pub fn from_flags(flags: &[bool]) -> Self {
        debug_assert!(flags.len() <= u32::BITS as usize);

        let bits = flags
            .iter()
            .enumerate()
            .filter(|(_, flag)| **flag)
            .fold(0, |bits, (position, _)| bits | (1 << position));

        Self {
            bits,
            width: flags.len() as u8,
        }
    }

    pub fn width(&self) -> usize {
        self.width as usize
    }

    pub fn flag(&self, constraint: usize) -> bool {
        constraint < self.width() && self.bits & (1 << constraint) != 0
    }

    /// same key with flag `constraint` negated
    pub fn flipped(&self, constraint: usize) -> Self {
        debug_assert!(constraint < self.width());

        Self {
            bits: self.bits ^ (1 << constraint),
            width: self.width,
        }
    }

    pub fn flags(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.width()).map(|position| self.flag(position))
    }
}

impl fmt::Display for ConstraintKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (position, flag) in self.flags().enumerate() {
            if position > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", if flag { 'T' } else { 'F' })?;
        }
        write!(f, ")")
    }
}

impl Serialize for ConstraintKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One experiment run with all of its configuration results
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Instance {
    pub id: ID,
    pub problem: Option<Problem>,
    pub results: BTreeMap<ConstraintKey, SolverResults>,
}

impl Instance {
    pub fn empty(id: ID) -> Self {
        Self {
            id,
            problem: None,
            results: BTreeMap::new(),
        }
    }
}
