//! Error types for leaderboard persistence

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LeaderboardError {
    #[error("no data directory available")]
    NoDataDir,

    #[error("failed to create leaderboard directory {path}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read leaderboard file {path}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse leaderboard file {path}")]
    ParseToml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to serialize leaderboard")]
    Serialize(#[source] toml::ser::Error),

    #[error("failed to write leaderboard file {path}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
