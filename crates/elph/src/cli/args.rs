//! CLI argument structs for all commands.
//!
//! Each command has its own argument struct with clap derive attributes
//! for parsing and validation.

use clap::Parser;
use std::num::NonZeroUsize;
use std::path::PathBuf;

/// Arguments for the `init` command
#[derive(Parser, Debug, Clone, Default)]
pub struct InitArgs {}

/// Arguments for the `list` command
#[derive(Parser, Debug, Clone)]
pub struct ListArgs {
    /// Glob patterns matched against project names and directories
    ///
    /// Lists every project when omitted.
    pub patterns: Vec<String>,

    /// Fail if any pattern matches nothing
    #[arg(long)]
    pub strict: bool,
}

/// Arguments for the `deps` command
#[derive(Parser, Debug, Clone)]
pub struct DepsArgs {
    /// Glob patterns selecting the projects to import
    #[arg(required = true)]
    pub patterns: Vec<String>,

    /// Also import projects that directly use the selected ones
    #[arg(short, long)]
    pub users: bool,

    /// File listing projects already imported into the IDE (one per line)
    #[arg(short, long, value_name = "FILE")]
    pub imported: Option<PathBuf>,
}

/// Arguments for the `users` command
#[derive(Parser, Debug, Clone)]
pub struct UsersArgs {
    /// Glob patterns selecting the projects
    #[arg(required = true)]
    pub patterns: Vec<String>,

    /// File listing projects already imported into the IDE (one per line)
    #[arg(short, long, value_name = "FILE")]
    pub imported: Option<PathBuf>,
}

/// Arguments for the `leaves` command
#[derive(Parser, Debug, Clone)]
pub struct LeavesArgs {
    /// Glob patterns selecting the subset
    #[arg(required = true)]
    pub patterns: Vec<String>,

    /// Maximum number of leaves to print
    #[arg(short = 'n', long, default_value = "10")]
    pub limit: NonZeroUsize,
}

/// Arguments for the `order` command
#[derive(Parser, Debug, Clone)]
pub struct OrderArgs {
    /// Glob patterns selecting the projects to order
    #[arg(required = true)]
    pub patterns: Vec<String>,
}

/// Arguments for the `show` command
#[derive(Parser, Debug, Clone)]
pub struct ShowArgs {
    /// Project name or symbolic name
    pub name: String,
}

/// Arguments for the `reanalyze` command
#[derive(Parser, Debug, Clone, Default)]
pub struct ReanalyzeArgs {}
