//! Data directory resolution and first-run seeding.
//!
//! # Responsibility
//! - Pick the directory every repository snapshot lives in.
//! - Seed a scratch directory from the packaged initial-data set when no
//!   persistent directory is configured.
//!
//! # Invariants
//! - Resolution is deterministic: a configured persistent path always wins;
//!   scratch + seed only runs when none is configured.
//! - Preparing a persistent path is idempotent and never seeds it.
//! - A single resource that cannot be opened or copied is skipped; failing
//!   to create the target directory itself is fatal.

use crate::config::StoreConfig;
use log::{debug, error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Instant;
use uuid::Uuid;

const SCRATCH_DIR_PREFIX: &str = "yumyum-data";

/// Initial-data set compiled into the binary, keyed by resource path.
const PACKAGED_SEED: &[(&str, &str)] = &[
    ("/seed/accounts.json", include_str!("../../seed/accounts.json")),
    ("/seed/profiles.json", include_str!("../../seed/profiles.json")),
    ("/seed/diets.json", include_str!("../../seed/diets.json")),
    ("/seed/posts.json", include_str!("../../seed/posts.json")),
    ("/seed/follows.json", include_str!("../../seed/follows.json")),
    ("/seed/challenges.json", include_str!("../../seed/challenges.json")),
    ("/seed/exercises.json", include_str!("../../seed/exercises.json")),
    ("/seed/participants.json", include_str!("../../seed/participants.json")),
];

#[derive(Debug)]
pub enum BootstrapError {
    CreateDataDir {
        path: PathBuf,
        source: std::io::Error,
    },
    CreateScratchDir {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl Display for BootstrapError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CreateDataDir { path, source } => write!(
                f,
                "failed to prepare data directory `{}`: {source}",
                path.display()
            ),
            Self::CreateScratchDir { path, source } => write!(
                f,
                "failed to create scratch data directory `{}`: {source}",
                path.display()
            ),
        }
    }
}

impl Error for BootstrapError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::CreateDataDir { source, .. } | Self::CreateScratchDir { source, .. } => {
                Some(source)
            }
        }
    }
}

/// Read-only set of initial-data resources.
///
/// Resource paths use `/` separators; a path ending in `/` marks a directory
/// and is never copied.
pub trait SeedSource {
    fn resource_paths(&self) -> Vec<String>;
    /// Opens one resource for reading, or `None` when it cannot be opened.
    fn open(&self, resource: &str) -> Option<Box<dyn Read + '_>>;
}

/// Seed set embedded at compile time.
#[derive(Debug, Clone, Copy)]
pub struct EmbeddedSeed {
    files: &'static [(&'static str, &'static str)],
}

impl EmbeddedSeed {
    /// The initial-data set shipped with this crate (one file per entity kind).
    pub fn packaged() -> Self {
        Self::new(PACKAGED_SEED)
    }

    pub fn new(files: &'static [(&'static str, &'static str)]) -> Self {
        Self { files }
    }
}

impl SeedSource for EmbeddedSeed {
    fn resource_paths(&self) -> Vec<String> {
        self.files
            .iter()
            .map(|(path, _)| (*path).to_string())
            .collect()
    }

    fn open(&self, resource: &str) -> Option<Box<dyn Read + '_>> {
        self.files
            .iter()
            .find(|(path, _)| *path == resource)
            .map(|(_, contents)| Box::new(contents.as_bytes()) as Box<dyn Read + '_>)
    }
}

/// Seed set read from the top level of a directory on disk.
#[derive(Debug, Clone)]
pub struct DirectorySeed {
    root: PathBuf,
}

impl DirectorySeed {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl SeedSource for DirectorySeed {
    fn resource_paths(&self) -> Vec<String> {
        let entries = match std::fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(err) => {
                warn!(
                    "event=seed_list module=bootstrap status=error root={} error={}",
                    self.root.display(),
                    err
                );
                return Vec::new();
            }
        };

        let mut paths = entries
            .filter_map(Result::ok)
            .filter_map(|entry| {
                let name = entry.file_name().to_str()?.to_string();
                let is_dir = entry.file_type().map(|kind| kind.is_dir()).unwrap_or(false);
                Some(if is_dir { format!("{name}/") } else { name })
            })
            .collect::<Vec<_>>();
        paths.sort();
        paths
    }

    fn open(&self, resource: &str) -> Option<Box<dyn Read + '_>> {
        File::open(self.root.join(resource))
            .ok()
            .map(|file| Box::new(file) as Box<dyn Read + '_>)
    }
}

/// Outcome of seeding one directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedReport {
    /// File names written into the target directory.
    pub copied: Vec<String>,
    /// Resource paths that could not be opened or copied.
    pub skipped: Vec<String>,
}

/// Selects the seed set named by config, or the packaged one.
pub fn seed_source_for(config: &StoreConfig) -> Box<dyn SeedSource> {
    match &config.seed_dir {
        Some(dir) => Box::new(DirectorySeed::new(dir)),
        None => Box::new(EmbeddedSeed::packaged()),
    }
}

/// Returns the data directory for this process.
///
/// Uses `config.data_dir` when set (creating it if needed); otherwise creates
/// a fresh scratch directory under the system temp dir and seeds it.
///
/// # Errors
/// - Returns an error when the chosen directory cannot be created.
pub fn resolve_data_directory(
    config: &StoreConfig,
    seed: &dyn SeedSource,
) -> Result<PathBuf, BootstrapError> {
    match &config.data_dir {
        Some(path) => prepare_persistent_directory(path),
        None => create_scratch_directory(&std::env::temp_dir(), seed).map(|(path, _)| path),
    }
}

/// Ensures a persistent data directory exists. Safe to call on every startup.
pub fn prepare_persistent_directory(path: &Path) -> Result<PathBuf, BootstrapError> {
    match std::fs::create_dir_all(path) {
        Ok(()) => {
            info!(
                "event=data_dir_resolve module=bootstrap status=ok mode=persistent path={}",
                path.display()
            );
            Ok(path.to_path_buf())
        }
        Err(source) => {
            error!(
                "event=data_dir_resolve module=bootstrap status=error mode=persistent path={} error={}",
                path.display(),
                source
            );
            Err(BootstrapError::CreateDataDir {
                path: path.to_path_buf(),
                source,
            })
        }
    }
}

/// Creates `yumyum-data-<uuid>` under `parent` and seeds it from `seed`.
pub fn create_scratch_directory(
    parent: &Path,
    seed: &dyn SeedSource,
) -> Result<(PathBuf, SeedReport), BootstrapError> {
    let started_at = Instant::now();
    let path = parent.join(format!("{SCRATCH_DIR_PREFIX}-{}", Uuid::new_v4()));

    if let Err(source) = std::fs::create_dir_all(&path) {
        error!(
            "event=data_dir_resolve module=bootstrap status=error mode=scratch path={} error={}",
            path.display(),
            source
        );
        return Err(BootstrapError::CreateScratchDir { path, source });
    }

    let report = seed_directory(&path, seed);
    info!(
        "event=data_dir_resolve module=bootstrap status=ok mode=scratch path={} copied={} skipped={} duration_ms={}",
        path.display(),
        report.copied.len(),
        report.skipped.len(),
        started_at.elapsed().as_millis()
    );
    Ok((path, report))
}

/// Copies every file resource of `seed` into `target`, overwriting same-named files.
pub fn seed_directory(target: &Path, seed: &dyn SeedSource) -> SeedReport {
    let mut report = SeedReport::default();

    for resource in seed.resource_paths() {
        if resource.ends_with('/') {
            debug!("event=seed_copy module=bootstrap status=skip resource={resource} reason=directory");
            continue;
        }
        let file_name = match resource.rsplit('/').next() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => {
                report.skipped.push(resource);
                continue;
            }
        };
        let Some(mut input) = seed.open(&resource) else {
            warn!("event=seed_copy module=bootstrap status=skip resource={resource} reason=unreadable");
            report.skipped.push(resource);
            continue;
        };

        let destination = target.join(&file_name);
        let copied = File::create(&destination)
            .and_then(|mut output| std::io::copy(&mut input, &mut output));
        match copied {
            Ok(bytes) => {
                debug!("event=seed_copy module=bootstrap status=ok resource={resource} bytes={bytes}");
                report.copied.push(file_name);
            }
            Err(err) => {
                warn!(
                    "event=seed_copy module=bootstrap status=skip resource={resource} reason=copy_failed error={err}"
                );
                let _ = std::fs::remove_file(&destination);
                report.skipped.push(resource);
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::{EmbeddedSeed, SeedSource, PACKAGED_SEED};
    use crate::model::entity::EntityKind;
    use std::io::Read;

    #[test]
    fn packaged_seed_covers_every_kind() {
        let paths = EmbeddedSeed::packaged().resource_paths();
        assert_eq!(paths.len(), PACKAGED_SEED.len());
        for kind in EntityKind::ALL {
            let expected = format!("/seed/{}.json", kind.file_stem());
            assert!(paths.contains(&expected), "missing seed for {kind}");
        }
    }

    #[test]
    fn embedded_open_returns_contents_or_none() {
        let seed = EmbeddedSeed::new(&[("/data/a.json", "[]")]);
        let mut text = String::new();
        seed.open("/data/a.json")
            .expect("resource should open")
            .read_to_string(&mut text)
            .unwrap();
        assert_eq!(text, "[]");
        assert!(seed.open("/data/missing.json").is_none());
    }
}
