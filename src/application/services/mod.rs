//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (FileSystem, Stdio)
//! but are themselves concrete structs, not traits.

mod format;

pub use format::{FormatService, STDIO_PATH};
