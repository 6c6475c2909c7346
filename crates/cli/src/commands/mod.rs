//! CLI command implementations.

mod cart;

pub use cart::{Command, CommandError, run};
