//! Domain types for the project catalog.

use chrono::{DateTime, Local};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt::{self, Write as _};
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// One project of a bnd workspace, as read from its descriptor.
///
/// Projects are created once when the catalog scans the workspace and are
/// never modified afterwards. Identity is the [`name`](Self::name): two
/// projects with different names are never equal, whatever else they share.
#[derive(Debug, Clone, Serialize)]
pub struct Project {
    /// Unique logical name (the directory name).
    pub name: String,

    /// `Bundle-SymbolicName`, which may differ from `name`.
    pub symbolic_name: String,

    /// Project directory; the handle callers use to import the project.
    pub root: PathBuf,

    /// Dependency names declared directly in the descriptor.
    pub initial_deps: BTreeSet<String>,

    /// The project produces no bundle (`-nobundles: true`).
    pub is_no_bundle: bool,

    /// Publishing of the project's jar is disabled.
    pub publish_disabled: bool,

    /// Modification time of the descriptor file.
    #[serde(skip)]
    pub timestamp: SystemTime,
}

impl Project {
    /// Returns `true` if the symbolic name is an alternate identifier.
    #[must_use]
    pub fn symbolic_name_differs_from_name(&self) -> bool {
        self.symbolic_name != self.name
    }

    /// Returns `true` if the project produces a published bundle.
    ///
    /// Only such projects depend on the build image.
    #[must_use]
    pub fn builds_bundle(&self) -> bool {
        !self.is_no_bundle && !self.publish_disabled
    }

    /// The project directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Renders a human-readable, multi-line summary of the project.
    #[must_use]
    pub fn details(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.name);
        if self.symbolic_name_differs_from_name() {
            let _ = writeln!(out, "  symbolic name: {}", self.symbolic_name);
        }
        let _ = writeln!(out, "  root:          {}", self.root.display());
        let _ = writeln!(out, "  no bundle:     {}", self.is_no_bundle);
        let _ = writeln!(out, "  publish off:   {}", self.publish_disabled);
        let modified: DateTime<Local> = self.timestamp.into();
        let _ = writeln!(
            out,
            "  modified:      {}",
            modified.format("%Y-%m-%d %H:%M:%S")
        );
        if self.initial_deps.is_empty() {
            let _ = writeln!(out, "  declared deps: (none)");
        } else {
            let _ = writeln!(out, "  declared deps:");
            for dep in &self.initial_deps {
                let _ = writeln!(out, "    {dep}");
            }
        }
        out
    }
}

impl PartialEq for Project {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Project {}

impl Hash for Project {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl PartialOrd for Project {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Project {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name.cmp(&other.name)
    }
}

impl fmt::Display for Project {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
