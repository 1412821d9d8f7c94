//! Command execution logic.
//!
//! This module contains the implementation of all CLI commands.

use anyhow::Result;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use super::args::{
    DepsArgs, InitArgs, LeavesArgs, ListArgs, OrderArgs, ReanalyzeArgs, ShowArgs, UsersArgs,
};
use crate::app::{App, ImportedSet};
use crate::output::{self, OutputConfig, OutputMode};

/// Execute the init command
pub async fn execute_init(settings_dir: &Path, _args: &InitArgs, quiet: bool) -> Result<()> {
    use crate::commands::init;

    let result = init::init(settings_dir).await?;

    if !quiet {
        let config = OutputConfig::from_env();
        println!(
            "{} {}",
            output::success("Initialized elph settings in", &config),
            result.settings_dir.display()
        );
        println!("  Config: {}", result.config_file.display());
    }

    Ok(())
}

/// Execute the list command
pub fn execute_list(app: &App, args: &ListArgs, output_mode: OutputMode) -> Result<()> {
    let catalog = app.catalog();

    let paths: Vec<PathBuf> = if args.patterns.is_empty() {
        catalog
            .all_projects()
            .iter()
            .map(|p| p.root.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    } else if args.strict {
        catalog.find_projects_all(&args.patterns)?
    } else {
        args.patterns
            .iter()
            .flat_map(|pattern| catalog.find_projects(pattern))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    };

    output::print_paths(&paths, output_mode)?;
    Ok(())
}

/// Execute the deps command
pub async fn execute_deps(app: &App, args: &DepsArgs, output_mode: OutputMode) -> Result<()> {
    let catalog = app.catalog();
    let selected = catalog.find_projects_all(&args.patterns)?;
    let mut names = project_names(&selected);

    if args.users {
        let users = catalog.dependent_project_paths(&names).await;
        tracing::debug!(users = users.len(), "Adding direct users");
        names.extend(project_names(&users));
    }

    let mut required = catalog.required_project_paths(&names).await?;
    if let Some(file) = &args.imported {
        required = ImportedSet::load(file).await?.exclude(required);
    }

    output::print_paths(&required, output_mode)?;
    Ok(())
}

/// Execute the users command
pub async fn execute_users(app: &App, args: &UsersArgs, output_mode: OutputMode) -> Result<()> {
    let catalog = app.catalog();
    let selected = catalog.find_projects_all(&args.patterns)?;

    let mut users = catalog.dependent_project_paths(&project_names(&selected)).await;
    if let Some(file) = &args.imported {
        users = ImportedSet::load(file).await?.exclude(users);
    }

    output::print_paths(&users, output_mode)?;
    Ok(())
}

/// Execute the leaves command
pub async fn execute_leaves(app: &App, args: &LeavesArgs, output_mode: OutputMode) -> Result<()> {
    let catalog = app.catalog();
    let subset = catalog.find_projects_all(&args.patterns)?;
    let leaves = catalog.leaves_of_subset(&subset, args.limit).await?;
    output::print_paths(&leaves, output_mode)?;
    Ok(())
}

/// Execute the order command
pub async fn execute_order(app: &App, args: &OrderArgs, output_mode: OutputMode) -> Result<()> {
    let catalog = app.catalog();
    let selected = catalog.find_projects_all(&args.patterns)?;
    let ordered = catalog.in_topological_order(&selected).await?;
    output::print_paths(&ordered, output_mode)?;
    Ok(())
}

/// Execute the show command
pub async fn execute_show(app: &App, args: &ShowArgs, output_mode: OutputMode) -> Result<()> {
    let catalog = app.catalog();
    let project = catalog
        .project(&args.name)
        .ok_or_else(|| crate::error::Error::NotFound(args.name.clone()))?;

    let dependencies = catalog.dependencies_of(&project.name).await?;
    let dependents = catalog
        .dependent_project_paths(&[project.name.as_str()])
        .await;

    output::print_project(project, &dependencies, &dependents, output_mode)?;
    Ok(())
}

/// Execute the reanalyze command
pub async fn execute_reanalyze(
    app: &App,
    _args: &ReanalyzeArgs,
    output_mode: OutputMode,
) -> Result<()> {
    let catalog = app.catalog();
    catalog.reanalyze().await;

    let projects = catalog.all_projects().len();
    let oracle_edges = catalog.oracle_edges().len();
    let cache = catalog.options().cache_file.clone();

    match output_mode {
        OutputMode::Json => {
            output::print_json(&serde_json::json!({
                "projects": projects,
                "oracle_edges": oracle_edges,
                "total_edges": catalog.edge_count(),
                "cache_file": cache,
            }))?;
        }
        OutputMode::Text => {
            let config = OutputConfig::from_env();
            println!(
                "{} {} projects, {} oracle edges",
                output::success("Reanalyzed", &config),
                projects,
                oracle_edges
            );
            if let Some(cache) = cache {
                println!("  Cache: {}", cache.display());
            }
        }
    }
    Ok(())
}

/// Project names of the given roots (their directory names).
fn project_names(paths: &[PathBuf]) -> Vec<String> {
    paths
        .iter()
        .filter_map(|p| p.file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .collect()
}
