pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod export;
pub mod remote;

pub use error::{Error, Result};
pub use crate::core::*;
pub use config::{InterestsFile, Settings};
pub use remote::{resolve_git_remote, GerritRemote};
pub use export::{render, OutputFormat};
