//! CLI argument parsing and command dispatch.
//!
//! This module provides the command-line interface for elph using clap's
//! derive API.
//!
//! # Commands
//!
//! - `init`: Write a default configuration
//! - `list`: Find projects by glob
//! - `deps`: Projects to import for a selection, in build order
//! - `users`: Projects that directly use a selection
//! - `leaves`: Members of a selection that depend on no other member
//! - `order`: Order a selection by dependencies
//! - `show`: Show project details
//! - `reanalyze`: Re-query all dependencies and rewrite the cache
//!
//! # Global Flags
//!
//! - `--workspace`: Workspace directory (default: current directory)
//! - `--settings-dir`: Settings directory (default: `<workspace>/.elph`)
//! - `--json`: Output in JSON format (applies to all commands)
//! - `-v` / `-q`: More or less logging
//!
//! # Example
//!
//! ```bash
//! elph list 'com.example.*'
//! elph deps com.example.app --users --imported imported.txt
//! elph --json order 'com.example.*'
//! ```

mod args;
mod execute;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

pub use args::{
    DepsArgs, InitArgs, LeavesArgs, ListArgs, OrderArgs, ReanalyzeArgs, ShowArgs, UsersArgs,
};

use crate::logging::LogConfig;

/// Elph - import the right subset of a bnd workspace
///
/// Computes which projects a selection needs, and in which order to import
/// them, from the workspace's project descriptors and build-tool data.
#[derive(Parser, Debug)]
#[command(name = "elph")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Workspace directory containing the projects
    #[arg(short, long, global = true, value_name = "DIR")]
    pub workspace: Option<PathBuf>,

    /// Settings directory (default: <workspace>/.elph)
    #[arg(long, global = true, value_name = "DIR")]
    pub settings_dir: Option<PathBuf>,

    /// Output in JSON format for programmatic use
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase logging (-v info, -vv log, -vvv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Write a default configuration
    ///
    /// Creates the settings directory with `config.yaml`. The dependency
    /// cache is created on first use.
    Init(InitArgs),

    /// Find projects by glob
    ///
    /// Patterns support `*`, `?`, `**` and character classes and are matched
    /// against project names, symbolic names and directory names.
    List(ListArgs),

    /// Projects to import for a selection, in build order
    ///
    /// Prints the selected projects and everything they transitively depend
    /// on, dependencies first.
    Deps(DepsArgs),

    /// Projects that directly use a selection
    Users(UsersArgs),

    /// Members of a selection that depend on no other member
    Leaves(LeavesArgs),

    /// Order a selection by dependencies
    ///
    /// Only the selected projects are printed; nothing is added.
    Order(OrderArgs),

    /// Show project details
    Show(ShowArgs),

    /// Re-query all dependencies and rewrite the cache
    Reanalyze(ReanalyzeArgs),
}

impl Cli {
    /// Parse CLI arguments from command line
    pub fn parse_args() -> Self {
        <Self as Parser>::parse()
    }

    /// Parse CLI arguments from an iterator (for testing)
    ///
    /// # Errors
    ///
    /// Returns a clap error for invalid arguments.
    pub fn try_parse_from<I, T>(iter: I) -> std::result::Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(iter)
    }

    /// Logging configuration requested on the command line
    #[must_use]
    pub fn log_config(&self) -> LogConfig {
        LogConfig::from_flags(self.verbose, self.quiet)
    }

    /// Execute the CLI command
    ///
    /// # Errors
    ///
    /// Returns an error if the workspace cannot be opened or the command
    /// fails.
    pub async fn execute(&self) -> Result<()> {
        use crate::app::App;
        use crate::config::settings_dir;
        use crate::output::OutputMode;

        let output_mode = if self.json {
            OutputMode::Json
        } else {
            OutputMode::Text
        };

        let workspace = match &self.workspace {
            Some(dir) => dir.clone(),
            None => std::env::current_dir()?,
        };
        let settings = self.settings_dir.as_deref();

        match &self.command {
            Some(Commands::Init(args)) => {
                let dir = settings_dir(&workspace, settings);
                execute::execute_init(&dir, args, self.quiet).await
            }
            Some(Commands::List(args)) => {
                let app = App::open(&workspace, settings).await?;
                execute::execute_list(&app, args, output_mode)
            }
            Some(Commands::Deps(args)) => {
                let app = App::open(&workspace, settings).await?;
                execute::execute_deps(&app, args, output_mode).await
            }
            Some(Commands::Users(args)) => {
                let app = App::open(&workspace, settings).await?;
                execute::execute_users(&app, args, output_mode).await
            }
            Some(Commands::Leaves(args)) => {
                let app = App::open(&workspace, settings).await?;
                execute::execute_leaves(&app, args, output_mode).await
            }
            Some(Commands::Order(args)) => {
                let app = App::open(&workspace, settings).await?;
                execute::execute_order(&app, args, output_mode).await
            }
            Some(Commands::Show(args)) => {
                let app = App::open(&workspace, settings).await?;
                execute::execute_show(&app, args, output_mode).await
            }
            Some(Commands::Reanalyze(args)) => {
                let app = App::open(&workspace, settings).await?;
                execute::execute_reanalyze(&app, args, output_mode).await
            }
            None => {
                println!("Elph workspace import helper");
                println!("Use --help for more information");
                Ok(())
            }
        }
    }
}
