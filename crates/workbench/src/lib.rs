//! Workbench: core state and deterministic collaborators behind the MCP server:
//! a shared counter, a tagged note store, a calculator, and a clock.

pub mod calc;
pub mod clock;
pub mod store;
pub mod types;

pub use calc::{calculate, format_number, Calculation, Operation};
pub use clock::{format_now, parse_timezone, utc_timestamp};
pub use store::{Increment, Workbench, DEFAULT_NOTE_LIMIT};
pub use types::*;
