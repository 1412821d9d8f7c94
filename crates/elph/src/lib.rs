//! Elph - import a minimal, correctly ordered subset of a bnd workspace.
//!
//! The core is the [`catalog::Catalog`]: a dependency graph over every
//! project of a workspace, built from descriptors and enriched on demand
//! with authoritative dependencies from a [`oracle::DependencyOracle`].
//! Oracle results are cached on disk by `elph-cache`.

#![forbid(unsafe_code)]

// Public modules for library usage
pub mod catalog;
pub mod descriptor;
pub mod domain;
pub mod error;
pub mod oracle;

// Application layer (needed by binary)
pub mod app;
pub mod cli;
pub mod config;
pub mod logging;
pub mod output;

// Command implementations
pub mod commands;
