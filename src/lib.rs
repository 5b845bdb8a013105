//! notesync - keep a notes workspace in sync with git, object storage, or a local folder
//!
//! This crate provides the workspace synchronization core and the `ns` CLI.
//!
//! # Architecture
//!
//! - [`workspace`] - Session core: unsaved-content cache, autosave, save
//!   coordination, remote sync, background reconciliation, transient status
//! - [`backend`] - Backing stores (local folder, git working copy, bucket)
//! - [`model`] - Data types (Provider, SyncStatus, TransientStatus, TreeEntry)
//! - [`config`] - Configuration management
//! - [`cli`] - Command-line interface using clap
//! - [`error`] - Error types and handling

#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod backend;
pub mod cli;
pub mod config;
pub mod error;
pub mod model;
pub mod workspace;

pub use error::{Error, Result};
