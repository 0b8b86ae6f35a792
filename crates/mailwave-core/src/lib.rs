//! Mailwave Core Library
//!
//! This crate provides shared ids, events, errors, and configuration for the
//! Mailwave window-policy core.

pub mod config;
pub mod error;
pub mod types;

pub use config::ShellConfig;
pub use error::{MailwaveError, MailwaveResult};
