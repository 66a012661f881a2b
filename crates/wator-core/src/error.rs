//! Error types for the simulation.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Seeding infeasible: {requested} creatures requested but only {available} water cells are free")]
    SeedingInfeasible { requested: usize, available: usize },

    #[error("Partition error: cannot split {rows} rows across {workers} workers")]
    Partition { workers: usize, rows: usize },

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Thread pool error: {0}")]
    ThreadPool(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<bincode::Error> for Error {
    fn from(err: bincode::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
