use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Instant;

use anyhow::{Context, Result};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::discovery::{discover_files, DiscoveryConfig};
use crate::model::builder::build;
use crate::model::universe::Universe;
use crate::model::{CompilationUnit, UnitId};
use crate::parser::JavaParser;

/// A source file left out of the universe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadFailure {
    pub path: PathBuf,
    pub reason: String,
}

/// A project's compilation units, published as immutable snapshots.
///
/// Readers take a snapshot with [`Workspace::snapshot`] and resolve against it
/// without locking; a reload builds the new unit first and then swaps a new
/// universe in under a short write lock. Reloads and removals are serialized
/// so each one sees the universe left by the previous one.
#[derive(Debug)]
pub struct Workspace {
    root: PathBuf,
    universe: RwLock<Arc<Universe>>,
    next_id: AtomicU64,
    failures: RwLock<Vec<LoadFailure>>,
    writer: Mutex<()>,
}

/// Parse and build one source file into a compilation unit.
pub fn compile_source(source: &str, path: &Path, id: UnitId) -> Result<CompilationUnit> {
    let syntax = JavaParser::new()
        .parse(source, Some(path))
        .with_context(|| format!("failed to parse {}", path.display()))?;
    let unit = build(&syntax, id).with_context(|| format!("failed to build {}", path.display()))?;
    Ok(unit)
}

fn compile_file(path: &Path, id: UnitId) -> Result<CompilationUnit> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    compile_source(&source, path, id)
}

impl Workspace {
    /// Discover, parse and build every Java file under `root` in parallel.
    ///
    /// Files that fail to read, parse or build are logged and excluded; they
    /// never abort the load.
    pub fn load(root: &Path, config: &DiscoveryConfig) -> Result<Self> {
        let start = Instant::now();
        let files = discover_files(root, config)?;

        // Ids follow path order so repeated loads number units identically.
        let compiled: Vec<(PathBuf, Result<CompilationUnit>)> = files
            .par_iter()
            .enumerate()
            .map(|(index, path)| (path.clone(), compile_file(path, UnitId(index as u64 + 1))))
            .collect();

        let mut units = Vec::with_capacity(compiled.len());
        let mut failures = Vec::new();
        for (path, result) in compiled {
            match result {
                Ok(unit) => units.push(unit),
                Err(err) => {
                    warn!(path = %path.display(), error = %format!("{:#}", err), "unit excluded");
                    failures.push(LoadFailure {
                        path,
                        reason: format!("{:#}", err),
                    });
                }
            }
        }

        let universe = Universe::from_units(units);
        info!(
            root = %root.display(),
            units = universe.len(),
            excluded = failures.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "workspace loaded"
        );

        Ok(Self {
            root: root.to_path_buf(),
            universe: RwLock::new(Arc::new(universe)),
            next_id: AtomicU64::new(files.len() as u64 + 1),
            failures: RwLock::new(failures),
            writer: Mutex::new(()),
        })
    }

    /// The current universe. Later reloads do not affect the returned snapshot.
    pub fn snapshot(&self) -> Arc<Universe> {
        let guard = self.universe.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&guard)
    }

    pub fn failures(&self) -> Vec<LoadFailure> {
        self.failures
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn absolute(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    /// Rebuild the unit for `path` from `source` and publish a new snapshot.
    ///
    /// A unit that no longer builds is removed from the universe and recorded
    /// as a failure; the error is returned as well.
    pub fn reload(&self, path: &Path, source: &str) -> Result<UnitId> {
        let path = self.absolute(path);
        let _writer = self.writer.lock().unwrap_or_else(|e| e.into_inner());
        let existing = self.snapshot().unit_by_path(&path).map(|u| u.id());
        let id = existing.unwrap_or_else(|| UnitId(self.next_id.fetch_add(1, Ordering::Relaxed)));

        let compiled = compile_source(source, &path, id);
        self.forget_failure(&path);

        let mut guard = self.universe.write().unwrap_or_else(|e| e.into_inner());
        match compiled {
            Ok(unit) => {
                *guard = Arc::new(guard.with_unit(unit));
                debug!(path = %path.display(), unit = id.0, "unit reloaded");
                Ok(id)
            }
            Err(err) => {
                if existing.is_some() {
                    *guard = Arc::new(guard.without_unit(id));
                }
                drop(guard);
                warn!(path = %path.display(), error = %format!("{:#}", err), "unit excluded");
                self.failures
                    .write()
                    .unwrap_or_else(|e| e.into_inner())
                    .push(LoadFailure {
                        path,
                        reason: format!("{:#}", err),
                    });
                Err(err)
            }
        }
    }

    /// Drop the unit for `path`. Returns whether one was present.
    pub fn remove(&self, path: &Path) -> bool {
        let path = self.absolute(path);
        let _writer = self.writer.lock().unwrap_or_else(|e| e.into_inner());
        self.forget_failure(&path);

        let mut guard = self.universe.write().unwrap_or_else(|e| e.into_inner());
        let Some(id) = guard.unit_by_path(&path).map(|u| u.id()) else {
            return false;
        };
        *guard = Arc::new(guard.without_unit(id));
        debug!(path = %path.display(), unit = id.0, "unit removed");
        true
    }

    fn forget_failure(&self, path: &Path) {
        self.failures
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .retain(|f| f.path != path);
    }
}
