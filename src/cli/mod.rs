//! Tiller CLI

pub mod access;
pub mod config;
pub mod logging;
pub mod quote;

pub use config::{Cli, Command};
