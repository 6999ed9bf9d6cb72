//! Orchestra - interactive menu shell over a directory of pluggable tools

pub mod admin;
pub mod cli;
pub mod config;
pub mod error;
pub mod interrupt;
pub mod menu;
pub mod tools;

pub use config::{CliOptions, Settings};
pub use error::{OrchestraError, Result};
