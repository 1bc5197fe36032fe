//! Pairing of configuration results that differ in exactly one constraint flag

use super::BenchmarkDataset;
use crate::{
    config::ConstraintNames,
    database::{Instance, ID},
};
use itertools::Itertools;
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;
use tracing::{debug, instrument, warn};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PairingError {
    #[error("Constraint index {index} is out of range, {count} constraints are available")]
    ConstraintOutOfRange { index: i64, count: usize },
    #[error("Unknown constraint '{0}'")]
    UnknownConstraint(String),
    #[error("No matched pairs for constraint {constraint} with solvers {solvers}")]
    NoMatchedPairs { constraint: usize, solvers: String },
}

/// Which solvers to collect samples for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolverFilter {
    All,
    Only(Vec<String>),
}

impl SolverFilter {
    /// an empty selection means every solver, repeated names count once
    pub fn from_names(names: Vec<String>) -> Self {
        if names.is_empty() {
            Self::All
        } else {
            Self::Only(names.into_iter().unique().collect())
        }
    }
}

impl std::fmt::Display for SolverFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::Only(names) => write!(f, "{}", names.iter().join(", ")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairedSample {
    // None for samples not taken from a loaded instance
    pub instance: Option<ID>,
    // primary measurement with the flag set
    pub truthy: f64,
    // primary measurement of the same configuration with the flag cleared
    pub falsy: f64,
}

/// Paired measurements; both sides always have the same length
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Samples {
    samples: Vec<PairedSample>,
}

impl Samples {
    pub fn push(&mut self, sample: PairedSample) {
        self.samples.push(sample);
    }

    /// Pair two independently collected sequences by position. Trailing
    /// values of the longer sequence have no partner and are dropped with a
    /// warning.
    pub fn from_sequences(truthy: Vec<f64>, falsy: Vec<f64>) -> Self {
        if truthy.len() != falsy.len() {
            warn!(
                truthy = truthy.len(),
                falsy = falsy.len(),
                discarded = truthy.len().abs_diff(falsy.len()),
                "Mismatched pair count, truncating to the shorter sequence"
            );
        }

        Self {
            samples: truthy
                .into_iter()
                .zip(falsy)
                .map(|(truthy, falsy)| PairedSample {
                    instance: None,
                    truthy,
                    falsy,
                })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PairedSample> {
        self.samples.iter()
    }

    pub fn truthy(&self) -> Vec<f64> {
        self.samples.iter().map(|sample| sample.truthy).collect()
    }

    pub fn falsy(&self) -> Vec<f64> {
        self.samples.iter().map(|sample| sample.falsy).collect()
    }

    /// exchange both sides of every sample
    pub fn swapped(self) -> Self {
        Self {
            samples: self
                .samples
                .into_iter()
                .map(|sample| PairedSample {
                    instance: sample.instance,
                    truthy: sample.falsy,
                    falsy: sample.truthy,
                })
                .collect(),
        }
    }

    /// (truthy, falsy) points clamped into `[0, x_max] x [0, y_max]`
    pub fn clamped(&self, x_max: f64, y_max: f64) -> Vec<(f64, f64)> {
        self.samples
            .iter()
            .map(|sample| (sample.truthy.clamp(0.0, x_max), sample.falsy.clamp(0.0, y_max)))
            .collect()
    }
}

impl FromIterator<PairedSample> for Samples {
    fn from_iter<T: IntoIterator<Item = PairedSample>>(iter: T) -> Self {
        Self {
            samples: iter.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Pairing {
    pub constraint: usize,
    pub per_solver: BTreeMap<String, Samples>,
    // every solver's samples in scan order
    pub combined: Samples,
}

impl Pairing {
    pub fn solver(&self, name: &str) -> Option<&Samples> {
        self.per_solver.get(name)
    }

    pub fn swapped(self) -> Self {
        Self {
            constraint: self.constraint,
            per_solver: self
                .per_solver
                .into_iter()
                .map(|(name, samples)| (name, samples.swapped()))
                .collect(),
            combined: self.combined.swapped(),
        }
    }
}

/// Constraint chosen by flag position or by one of its configured names
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstraintSelector {
    Index(i64),
    Name(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedConstraint {
    pub index: usize,
    // the name selected the side where the flag is cleared
    pub negated: bool,
}

impl ConstraintSelector {
    pub fn resolve(
        &self,
        names: &[ConstraintNames],
        width: usize,
    ) -> Result<ResolvedConstraint, PairingError> {
        let resolved = match self {
            Self::Index(index) => {
                let index = usize::try_from(*index)
                    .ok()
                    .filter(|index| *index < width)
                    .ok_or(PairingError::ConstraintOutOfRange {
                        index: *index,
                        count: width,
                    })?;

                ResolvedConstraint {
                    index,
                    negated: false,
                }
            }
            Self::Name(name) => names
                .iter()
                .enumerate()
                .find_map(|(index, pair)| {
                    if pair.when_set() == name {
                        Some(ResolvedConstraint {
                            index,
                            negated: false,
                        })
                    } else if pair.when_unset() == name {
                        Some(ResolvedConstraint {
                            index,
                            negated: true,
                        })
                    } else {
                        None
                    }
                })
                .ok_or_else(|| PairingError::UnknownConstraint(name.clone()))?,
        };

        if resolved.index >= width {
            return Err(PairingError::ConstraintOutOfRange {
                index: resolved.index as i64,
                count: width,
            });
        }

        Ok(resolved)
    }
}

/// Pair every configuration with its complement in flag `constraint`
/// within the same instance and collect the primary measurements.
pub fn pair(
    instances: &[Instance],
    constraint: usize,
    width: usize,
    solvers: &SolverFilter,
) -> Result<Pairing, PairingError> {
    if constraint >= width {
        return Err(PairingError::ConstraintOutOfRange {
            index: constraint as i64,
            count: width,
        });
    }

    let mut per_solver: BTreeMap<String, Samples> = BTreeMap::new();
    let mut combined = Samples::default();

    for instance in instances {
        let mut processed = BTreeSet::new();

        for key in instance.results.keys() {
            if processed.contains(key) {
                continue;
            }

            let complement = key.flipped(constraint);
            if !instance.results.contains_key(&complement) {
                continue;
            }

            processed.insert(*key);
            processed.insert(complement);

            let (true_key, false_key) = if key.flag(constraint) {
                (*key, complement)
            } else {
                (complement, *key)
            };
            let true_side = &instance.results[&true_key];
            let false_side = &instance.results[&false_key];

            let selected: Vec<&String> = match solvers {
                SolverFilter::All => true_side.keys().collect(),
                SolverFilter::Only(names) => names.iter().unique().collect(),
            };

            for solver in selected {
                match (true_side.get(solver), false_side.get(solver)) {
                    (Some(truthy), Some(falsy)) => {
                        let sample = PairedSample {
                            instance: Some(instance.id),
                            truthy: truthy.primary(),
                            falsy: falsy.primary(),
                        };

                        per_solver.entry(solver.clone()).or_default().push(sample);
                        combined.push(sample);
                    }
                    _ => debug!(
                        instance = instance.id,
                        solver = %solver,
                        key = %true_key,
                        "Solver missing on one side of the pair"
                    ),
                }
            }
        }
    }

    if combined.is_empty() {
        return Err(PairingError::NoMatchedPairs {
            constraint,
            solvers: solvers.to_string(),
        });
    }

    Ok(Pairing {
        constraint,
        per_solver,
        combined,
    })
}

impl BenchmarkDataset {
    #[instrument(skip(self), level = "debug")]
    pub fn pair(&self, constraint: usize, solvers: &SolverFilter) -> Result<Pairing, PairingError> {
        let pairing = pair(self.instances(), constraint, self.width(), solvers)?;

        debug!(
            pairs = pairing.combined.len(),
            solvers = pairing.per_solver.len(),
            "Paired configurations"
        );

        Ok(pairing)
    }

    /// name of constraint `index` among the columns found by `list_constraints`
    pub fn constraint_column(&self, index: i64) -> Result<String, PairingError> {
        let constraints = self.list_constraints();

        usize::try_from(index)
            .ok()
            .and_then(|index| constraints.get(&index).cloned())
            .ok_or(PairingError::ConstraintOutOfRange {
                index,
                count: constraints.len(),
            })
    }

    /// pair by selector, oriented so the selected side ends up as `truthy`
    pub fn pair_selected(
        &self,
        selector: &ConstraintSelector,
        names: &[ConstraintNames],
        solvers: &SolverFilter,
    ) -> Result<(ResolvedConstraint, Pairing), PairingError> {
        let resolved = selector.resolve(names, self.width())?;
        let pairing = self.pair(resolved.index, solvers)?;

        if resolved.negated {
            Ok((resolved, pairing.swapped()))
        } else {
            Ok((resolved, pairing))
        }
    }
}
