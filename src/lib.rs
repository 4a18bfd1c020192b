#![allow(clippy::module_name_repetitions)]
//! oceanix-devsub: local development launcher for the Oceanix CRM front-end.
//!
//! The front-end picks its tenant from a `localStorage` key. This crate patches
//! the entry-point HTML so the browser preloads a chosen tenant, runs the dev
//! server, and puts the original document back when the server stops.

pub mod bootstrap;
mod color;
pub mod config;
mod errors;
pub mod guard;
pub mod inject;
pub mod lock;
pub mod serve;
pub mod signals;
pub mod snapshot;
#[cfg(feature = "tracing")]
pub mod telemetry;

pub use color::*;
pub use errors::*;
pub use guard::EntryGuard;
pub use inject::{build_fragment, inject, Injection};
pub use snapshot::{BackupOutcome, SnapshotPolicy};
