//! Shared types for the gridrank workspace: configuration, the `Rank` sum
//! type, grid constants, and the stored-record shapes handed from the
//! database layer to the aggregation engine.

mod app_config;
mod config;
pub mod rank;
pub mod records;

pub use app_config::{AppConfig, Environment, TargetMatch};
pub use config::{load_app_config, load_app_config_from_env};
pub use rank::{Rank, SENTINEL_RANK};
pub use records::{CellRecord, CompetitorRecord, GridSnapshot, PointResultRecord, SearchRecord};

use thiserror::Error;

/// Rows and columns of a standard scan lattice.
pub const DEFAULT_GRID_DIMENSION: u32 = 13;

/// Number of competitors published per search and per grid point.
pub const TOP_COMPETITORS: usize = 20;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
