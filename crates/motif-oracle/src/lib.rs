//! Motif Oracle
//!
//! Three six-sided dice answer a yes/no question:
//! - die 1 gives the answer (Plain or Mixed table)
//! - die 2 qualifies it (Wrinkle or Certainty table)
//! - die 3 rates a chosen focus (Activity, Safety, ...)
//!
//! Free-form game rolls (`3d6 + 2`) are logged alongside.

mod error;
mod game;
mod log;
mod table;

pub use error::OracleError;
pub use game::{DiceType, GameRoll, GameRollResult};
pub use log::{escape_html, format_clock, game_log_entry, oracle_log_entry};
pub use table::{interpret, Answer, Focus, Modifier, OracleRoll, OracleSelection};

pub type Result<T> = std::result::Result<T, OracleError>;
