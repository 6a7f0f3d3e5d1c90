//! Public library modules for the CLI crate
pub mod output;
pub mod session;
pub mod watch;
