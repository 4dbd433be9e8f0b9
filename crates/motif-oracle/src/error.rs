//! Oracle error types

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum OracleError {
    #[error("Die face out of range: {0}")]
    InvalidFace(u8),

    #[error("Unknown oracle table: {0}")]
    UnknownTable(String),

    #[error("Unknown dice type: {0}")]
    UnknownDice(String),

    #[error("Dice count must be between 1 and {max}, got {count}")]
    InvalidCount { count: u32, max: u32 },
}
