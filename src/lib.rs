//! refmt: convert, merge and edit configuration documents.
//!
//! Documents in JSON, YAML, TOML or env format decode into one tree model
//! ([`domain::Node`]). The domain layer merges trees, flattens them into
//! path-keyed maps, sets values by dotted key and applies the per-key option
//! annotations (`"password[b64]"`) carried in mapping keys.
//!
//! Layers:
//! - [`domain`]: tree model and pure tree operations
//! - [`application`]: format codecs and the document service
//! - [`infrastructure`]: filesystem/stdio implementations and wiring
//! - [`cli`]: argument parsing and command dispatch

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
