//! Command implementations for the xmlsift CLI
//!
//! Each command is organized into its own module with its clap arguments.

pub mod config;
pub mod filter;
pub mod version;
