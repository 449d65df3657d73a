//! Generic file-backed repository.
//!
//! # Responsibility
//! - Own one in-memory collection per entity kind.
//! - Load that collection from, and persist it to, one snapshot file.
//!
//! # Invariants
//! - Every stored record carries a unique `Some(id)`.
//! - Ids come from a monotonic counter and are never reused within a process.
//! - `save` validates before touching the collection; a rejected record leaves
//!   state unchanged.
//! - One mutex guards the collection; disk I/O only happens in `load_from`
//!   and `save_to_disk`, under the same mutex.
//! - Writes fail with `RepoError::Closed` while the repository's access gate
//!   is closed. The gate is checked under the collection mutex.

use crate::codec::{Codec, CodecError, JsonCodec};
use crate::model::entity::{Entity, EntityId, EntityKind, IdPolicy, ValidationError};
use log::{error, info, warn};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for validation and snapshot I/O.
#[derive(Debug)]
pub enum RepoError {
    Validation(ValidationError),
    Io {
        kind: EntityKind,
        path: PathBuf,
        source: std::io::Error,
    },
    Codec {
        kind: EntityKind,
        path: PathBuf,
        source: CodecError,
    },
    InvalidData {
        kind: EntityKind,
        path: PathBuf,
        message: String,
    },
    /// Persist requested before the repository was bound to a data directory.
    Unbound(EntityKind),
    /// Write attempted while the owning store is not ready.
    Closed(EntityKind),
    /// No id is left to assign, or an explicit id leaves no successor.
    IdExhausted(EntityKind),
}

impl RepoError {
    /// Entity kind the failure belongs to.
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Validation(err) => err.kind,
            Self::Io { kind, .. }
            | Self::Codec { kind, .. }
            | Self::InvalidData { kind, .. }
            | Self::Unbound(kind)
            | Self::Closed(kind)
            | Self::IdExhausted(kind) => *kind,
        }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Io { kind, path, source } => {
                write!(f, "{kind} snapshot I/O failed at `{}`: {source}", path.display())
            }
            Self::Codec { kind, path, source } => {
                write!(f, "{kind} snapshot at `{}`: {source}", path.display())
            }
            Self::InvalidData {
                kind,
                path,
                message,
            } => write!(
                f,
                "invalid persisted {kind} data at `{}`: {message}",
                path.display()
            ),
            Self::Unbound(kind) => write!(f, "{kind} repository is not bound to a data directory"),
            Self::Closed(kind) => write!(f, "{kind} repository is closed for writes"),
            Self::IdExhausted(kind) => write!(f, "{kind} id space exhausted"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Io { source, .. } => Some(source),
            Self::Codec { source, .. } => Some(source),
            Self::InvalidData { .. }
            | Self::Unbound(_)
            | Self::Closed(_)
            | Self::IdExhausted(_) => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

/// In-memory CRUD contract consumed by layers above the store.
pub trait Repository<T: Entity> {
    /// Snapshot of all records in insertion order.
    fn find_all(&self) -> Vec<T>;
    fn find_by_id(&self, id: EntityId) -> Option<T>;
    /// Inserts or fully replaces one record; returns it with its id set.
    fn save(&self, entity: T) -> RepoResult<T>;
    /// Removes one record. Returns `Ok(false)` (and does nothing) when absent.
    fn delete(&self, id: EntityId) -> RepoResult<bool>;
}

/// Shared open/closed switch deciding whether a repository accepts writes.
///
/// Clones observe the same switch.
#[derive(Debug, Clone)]
pub(crate) struct AccessGate(Arc<AtomicBool>);

impl AccessGate {
    pub(crate) fn open() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    pub(crate) fn closed() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    pub(crate) fn set_open(&self, open: bool) {
        self.0.store(open, Ordering::SeqCst);
    }

    pub(crate) fn is_open(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

struct Collection<T> {
    records: HashMap<EntityId, T>,
    order: Vec<EntityId>,
    next_id: EntityId,
}

impl<T: Entity> Collection<T> {
    fn empty() -> Self {
        Self {
            records: HashMap::new(),
            order: Vec::new(),
            next_id: 1,
        }
    }

    fn from_snapshot(records: Vec<T>) -> Result<Self, String> {
        let mut collection = Self::empty();
        for record in records {
            let id = match record.id() {
                Some(id) if id != 0 => id,
                _ => return Err("record without id".to_string()),
            };
            let successor = id
                .checked_add(1)
                .ok_or_else(|| format!("id {id} exhausts the id space"))?;
            if collection.records.contains_key(&id) {
                return Err(format!("duplicate id {id}"));
            }
            record
                .validate()
                .map_err(|err| format!("record {id}: {err}"))?;
            collection.next_id = collection.next_id.max(successor);
            collection.order.push(id);
            collection.records.insert(id, record);
        }
        Ok(collection)
    }

    fn snapshot(&self) -> Vec<T> {
        self.order
            .iter()
            .filter_map(|id| self.records.get(id).cloned())
            .collect()
    }

    /// Hands out `next_id`. `EntityId::MAX` is never assigned; it only
    /// marks an exhausted counter.
    fn allocate_id(&mut self) -> RepoResult<EntityId> {
        let id = self.next_id;
        self.next_id = id.checked_add(1).ok_or(RepoError::IdExhausted(T::KIND))?;
        Ok(id)
    }

    fn upsert(&mut self, mut entity: T) -> RepoResult<T> {
        let requested = entity.id().filter(|id| *id != 0);
        let id = match requested {
            Some(id) if self.records.contains_key(&id) => id,
            Some(id) if T::ID_POLICY == IdPolicy::Explicit => {
                let successor = id.checked_add(1).ok_or(RepoError::IdExhausted(T::KIND))?;
                self.next_id = self.next_id.max(successor);
                id
            }
            _ => self.allocate_id()?,
        };
        entity.set_id(id);
        if self.records.insert(id, entity.clone()).is_none() {
            self.order.push(id);
        }
        Ok(entity)
    }

    fn remove(&mut self, id: EntityId) -> Option<T> {
        let removed = self.records.remove(&id)?;
        self.order.retain(|existing| *existing != id);
        Some(removed)
    }
}

struct RepoState<T> {
    dir: Option<PathBuf>,
    collection: Collection<T>,
}

/// Mutex-guarded collection persisted as one snapshot file per kind.
pub struct FileRepository<T: Entity, C: Codec<T> = JsonCodec> {
    codec: C,
    gate: AccessGate,
    state: Mutex<RepoState<T>>,
}

impl<T: Entity> FileRepository<T, JsonCodec> {
    /// Creates an unbound, empty repository using the JSON codec.
    pub fn new() -> Self {
        Self::with_codec(JsonCodec)
    }
}

impl<T: Entity> Default for FileRepository<T, JsonCodec> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Entity, C: Codec<T>> FileRepository<T, C> {
    /// Creates an unbound, empty repository that accepts writes.
    pub fn with_codec(codec: C) -> Self {
        Self::gated(codec, AccessGate::open())
    }

    /// Creates a repository whose writes follow `gate`.
    pub(crate) fn gated(codec: C, gate: AccessGate) -> Self {
        Self {
            codec,
            gate,
            state: Mutex::new(RepoState {
                dir: None,
                collection: Collection::empty(),
            }),
        }
    }

    /// Snapshot file name, e.g. `diets.json`.
    pub fn file_name(&self) -> String {
        format!("{}.{}", T::KIND.file_stem(), self.codec.file_extension())
    }

    /// Path of the bound snapshot file, if any.
    pub fn path(&self) -> Option<PathBuf> {
        let state = self.lock();
        state.dir.as_ref().map(|dir| dir.join(self.file_name()))
    }

    pub fn len(&self) -> usize {
        self.lock().collection.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Binds to `dir` and replaces in-memory state with the snapshot on disk.
    ///
    /// A missing file yields an empty collection. Unreadable, undecodable or
    /// inconsistent snapshots are errors and leave the previous state in place.
    pub(crate) fn load_from(&self, dir: &Path) -> RepoResult<usize> {
        let started_at = Instant::now();
        let path = dir.join(self.file_name());
        let mut state = self.lock();

        let loaded = match std::fs::read(&path) {
            Ok(bytes) => self.decode_snapshot(&path, &bytes),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    "event=repo_load module=repo status=skip kind={} path={} reason=missing_file",
                    T::KIND,
                    path.display()
                );
                Ok(Collection::empty())
            }
            Err(source) => Err(RepoError::Io {
                kind: T::KIND,
                path: path.clone(),
                source,
            }),
        };
        let collection = match loaded {
            Ok(collection) => collection,
            Err(err) => {
                error!(
                    "event=repo_load module=repo status=error kind={} path={} duration_ms={} error={}",
                    T::KIND,
                    path.display(),
                    started_at.elapsed().as_millis(),
                    err
                );
                return Err(err);
            }
        };

        let count = collection.order.len();
        state.collection = collection;
        state.dir = Some(dir.to_path_buf());
        info!(
            "event=repo_load module=repo status=ok kind={} path={} count={} duration_ms={}",
            T::KIND,
            path.display(),
            count,
            started_at.elapsed().as_millis()
        );
        Ok(count)
    }

    /// Overwrites the bound snapshot file with the current collection.
    ///
    /// Writes a sibling `.tmp` file first and renames it into place, so the
    /// previous snapshot survives a failed write.
    pub(crate) fn save_to_disk(&self) -> RepoResult<usize> {
        let started_at = Instant::now();
        let state = self.lock();
        let dir = state.dir.as_ref().ok_or(RepoError::Unbound(T::KIND))?;
        let path = dir.join(self.file_name());
        let records = state.collection.snapshot();

        let result = self
            .codec
            .encode(&records)
            .map_err(|source| RepoError::Codec {
                kind: T::KIND,
                path: path.clone(),
                source,
            })
            .and_then(|bytes| write_replace(T::KIND, &path, &bytes));

        match result {
            Ok(()) => {
                info!(
                    "event=repo_persist module=repo status=ok kind={} path={} count={} duration_ms={}",
                    T::KIND,
                    path.display(),
                    records.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(records.len())
            }
            Err(err) => {
                error!(
                    "event=repo_persist module=repo status=error kind={} path={} duration_ms={} error={}",
                    T::KIND,
                    path.display(),
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }

    /// Records matching `predicate`, in insertion order.
    pub fn find_where(&self, predicate: impl Fn(&T) -> bool) -> Vec<T> {
        let state = self.lock();
        state
            .collection
            .order
            .iter()
            .filter_map(|id| state.collection.records.get(id))
            .filter(|record| predicate(*record))
            .cloned()
            .collect()
    }

    /// Applies `change` to a copy of one record and stores it if still valid.
    ///
    /// Returns `Ok(None)` when `id` is absent.
    pub fn update_with<R>(
        &self,
        id: EntityId,
        change: impl FnOnce(&mut T) -> R,
    ) -> RepoResult<Option<R>> {
        let mut state = self.lock_for_write()?;
        let Some(current) = state.collection.records.get(&id) else {
            return Ok(None);
        };
        let mut updated = current.clone();
        let output = change(&mut updated);
        updated.set_id(id);
        updated.validate().map_err(reject)?;
        state.collection.records.insert(id, updated);
        Ok(Some(output))
    }

    /// Removes every record matching `predicate`; returns how many were removed.
    pub fn delete_where(&self, predicate: impl Fn(&T) -> bool) -> RepoResult<usize> {
        let mut state = self.lock_for_write()?;
        let doomed = state
            .collection
            .order
            .iter()
            .copied()
            .filter(|id| {
                state
                    .collection
                    .records
                    .get(id)
                    .is_some_and(|record| predicate(record))
            })
            .collect::<Vec<_>>();
        for id in &doomed {
            state.collection.remove(*id);
        }
        Ok(doomed.len())
    }

    fn decode_snapshot(&self, path: &Path, bytes: &[u8]) -> RepoResult<Collection<T>> {
        let records = self.codec.decode(bytes).map_err(|source| RepoError::Codec {
            kind: T::KIND,
            path: path.to_path_buf(),
            source,
        })?;
        Collection::from_snapshot(records).map_err(|message| RepoError::InvalidData {
            kind: T::KIND,
            path: path.to_path_buf(),
            message,
        })
    }

    fn lock(&self) -> MutexGuard<'_, RepoState<T>> {
        // Collections are only mutated after validation; poisoned state is still consistent.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_for_write(&self) -> RepoResult<MutexGuard<'_, RepoState<T>>> {
        let state = self.lock();
        if !self.gate.is_open() {
            error!(
                "event=repo_write module=repo status=error kind={} error_code=closed",
                T::KIND
            );
            return Err(RepoError::Closed(T::KIND));
        }
        Ok(state)
    }
}

impl<T: Entity, C: Codec<T>> Repository<T> for FileRepository<T, C> {
    fn find_all(&self) -> Vec<T> {
        self.lock().collection.snapshot()
    }

    fn find_by_id(&self, id: EntityId) -> Option<T> {
        self.lock().collection.records.get(&id).cloned()
    }

    fn save(&self, entity: T) -> RepoResult<T> {
        entity.validate().map_err(reject)?;
        self.lock_for_write()?.collection.upsert(entity)
    }

    fn delete(&self, id: EntityId) -> RepoResult<bool> {
        Ok(self.lock_for_write()?.collection.remove(id).is_some())
    }
}

fn reject(err: ValidationError) -> RepoError {
    warn!(
        "event=repo_save module=repo status=error kind={} error_code=validation field={}",
        err.kind, err.field
    );
    RepoError::Validation(err)
}

fn write_replace(kind: EntityKind, path: &Path, bytes: &[u8]) -> RepoResult<()> {
    let tmp_path = path.with_extension("tmp");
    let io_error = |source| RepoError::Io {
        kind,
        path: path.to_path_buf(),
        source,
    };
    std::fs::write(&tmp_path, bytes).map_err(io_error)?;
    std::fs::rename(&tmp_path, path).map_err(|source| {
        let _ = std::fs::remove_file(&tmp_path);
        io_error(source)
    })
}
