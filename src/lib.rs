//! Configuration export/import tools and the `sysconfig` worker they talk to.

pub mod config;
pub mod error;
pub mod sysconfig;
pub mod telemetry;
pub mod tools;

pub use error::{ToolError, report};
