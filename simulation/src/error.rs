//! Error types for the simulation.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("position ({x}, {y}) is outside the {width}x{height} grid")]
    OutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),

    /// A structural invariant of the world is broken. The running tick is
    /// aborted because continuing would corrupt further cells.
    #[error("Inconsistent world state: {0}")]
    Inconsistent(String),

    #[error("Component error: {0}")]
    Component(#[from] hecs::ComponentError),

    #[error("Entity error: {0}")]
    NoSuchEntity(#[from] hecs::NoSuchEntity),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
