//! udimscan CLI library.
//!
//! Scene loading, presentation sinks and the command implementations behind
//! the `udimscan` binary.

pub mod commands;
pub mod input;
pub mod logging;
pub mod sink;
