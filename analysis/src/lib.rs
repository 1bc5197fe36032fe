pub mod config;
pub mod database;
pub mod dataset;
pub mod plot;

#[cfg(test)]
pub(crate) mod test_util;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Failed to load config: {0}")]
    Config(#[from] config::ConfigErrors),
    #[error("Failed to load benchmark results: {0}")]
    Connection(#[from] database::ConnectionError),
    #[error("Failed to pair results: {0}")]
    Pairing(#[from] dataset::pairing::PairingError),
    #[error("Failed to plot: {0}")]
    Plot(#[from] plot::PlotError),
    #[error("Failed to serialize output: {0}")]
    Output(#[from] serde_yaml::Error),
}
