pub mod action;
pub mod analyzer;
pub mod assets;
pub mod boundary;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod github;
pub mod handoff;
pub mod ui;

pub use error::{ReleaseError, Result};
