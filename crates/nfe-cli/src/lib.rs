//! Library side of the `nfe-txt` binary: logging setup and the commands it runs.

pub mod commands;
pub mod logging;
pub mod types;
