//! CLI command implementations

pub mod check;
pub mod completions;
pub mod directory;
pub mod init;
pub mod process;
pub mod report;
pub mod routing;
pub mod watch;
