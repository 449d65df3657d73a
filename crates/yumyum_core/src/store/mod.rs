//! Data store lifecycle coordinator.
//!
//! # Responsibility
//! - Hold one repository per entity kind for the whole process.
//! - Bind and load every repository on `start`; persist every repository on
//!   `stop`.
//!
//! # Invariants
//! - Phases advance `Uninitialized -> Initializing -> Ready -> ShuttingDown
//!   -> Stopped`; `Stopped` may `start` again.
//! - Repository accessors only succeed in `Ready`.
//! - Repository writes only succeed in `Ready`, including through references
//!   obtained earlier.
//! - A failed persist of one kind never prevents the other kinds from being
//!   persisted.
//! - The store owns no entity data itself.

pub mod bootstrap;

use crate::model::entity::EntityKind;
use crate::codec::JsonCodec;
use crate::repo::file_repo::{AccessGate, FileRepository, RepoError};
use crate::repo::{
    AccountRepository, ChallengeRepository, DietRepository, ExerciseRepository,
    FollowRepository, ParticipantRepository, PostRepository, ProfileRepository,
};
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Instant;

pub type StoreResult<T> = Result<T, StoreError>;

/// Store lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorePhase {
    Uninitialized,
    Initializing,
    Ready,
    ShuttingDown,
    Stopped,
}

impl StorePhase {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Initializing => "initializing",
            Self::Ready => "ready",
            Self::ShuttingDown => "shutting_down",
            Self::Stopped => "stopped",
        }
    }
}

impl Display for StorePhase {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug)]
pub enum StoreError {
    /// Repository access outside `Ready`.
    NotReady(StorePhase),
    InvalidTransition {
        from: StorePhase,
        action: &'static str,
    },
    /// A repository could not be loaded during `start`.
    Load(RepoError),
    Persist(RepoError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotReady(phase) => write!(f, "data store is not ready (phase: {phase})"),
            Self::InvalidTransition { from, action } => {
                write!(f, "cannot {action} data store in phase {from}")
            }
            Self::Load(err) => write!(f, "data store load failed: {err}"),
            Self::Persist(err) => write!(f, "data store persist failed: {err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Load(err) | Self::Persist(err) => Some(err),
            Self::NotReady(_) | Self::InvalidTransition { .. } => None,
        }
    }
}

/// Per-kind outcome of `DataStore::stop`.
#[derive(Debug, Default)]
pub struct ShutdownReport {
    /// Kinds persisted successfully, with their record counts.
    pub persisted: Vec<(EntityKind, usize)>,
    pub failures: Vec<RepoError>,
}

impl ShutdownReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Process-wide set of repositories with an explicit start/stop lifecycle.
///
/// Construct once and share through `Arc<DataStore>`.
pub struct DataStore {
    phase: RwLock<StorePhase>,
    gate: AccessGate,
    data_dir: RwLock<Option<PathBuf>>,
    accounts: AccountRepository,
    profiles: ProfileRepository,
    diets: DietRepository,
    posts: PostRepository,
    follows: FollowRepository,
    challenges: ChallengeRepository,
    exercises: ExerciseRepository,
    participants: ParticipantRepository,
}

impl Default for DataStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DataStore {
    /// Creates an uninitialized store with empty, unbound repositories.
    pub fn new() -> Self {
        let gate = AccessGate::closed();
        Self {
            phase: RwLock::new(StorePhase::Uninitialized),
            data_dir: RwLock::new(None),
            accounts: FileRepository::gated(JsonCodec, gate.clone()),
            profiles: FileRepository::gated(JsonCodec, gate.clone()),
            diets: FileRepository::gated(JsonCodec, gate.clone()),
            posts: FileRepository::gated(JsonCodec, gate.clone()),
            follows: FileRepository::gated(JsonCodec, gate.clone()),
            challenges: FileRepository::gated(JsonCodec, gate.clone()),
            exercises: FileRepository::gated(JsonCodec, gate.clone()),
            participants: FileRepository::gated(JsonCodec, gate.clone()),
            gate,
        }
    }

    pub fn phase(&self) -> StorePhase {
        *self.read_phase()
    }

    /// Directory bound by the last successful `start`.
    pub fn data_dir(&self) -> Option<PathBuf> {
        self.data_dir
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Binds every repository to `data_dir` and loads its snapshot.
    ///
    /// # Errors
    /// - `InvalidTransition` unless the store is `Uninitialized` or `Stopped`.
    /// - `Load` when any snapshot exists but cannot be read; the store falls
    ///   back to `Uninitialized`.
    pub fn start(&self, data_dir: &Path) -> StoreResult<()> {
        let started_at = Instant::now();
        {
            let mut phase = self.write_phase();
            if !matches!(*phase, StorePhase::Uninitialized | StorePhase::Stopped) {
                return Err(self.reject_transition(*phase, "start"));
            }
            *phase = StorePhase::Initializing;
        }
        info!(
            "event=store_start module=store status=start data_dir={}",
            data_dir.display()
        );

        if let Err(err) = self.load_all(data_dir) {
            *self.write_phase() = StorePhase::Uninitialized;
            error!(
                "event=store_start module=store status=error data_dir={} duration_ms={} error={}",
                data_dir.display(),
                started_at.elapsed().as_millis(),
                err
            );
            return Err(StoreError::Load(err));
        }

        *self
            .data_dir
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(data_dir.to_path_buf());
        {
            let mut phase = self.write_phase();
            self.gate.set_open(true);
            *phase = StorePhase::Ready;
        }
        info!(
            "event=store_start module=store status=ok data_dir={} duration_ms={}",
            data_dir.display(),
            started_at.elapsed().as_millis()
        );
        Ok(())
    }

    /// Persists every kind, then moves to `Stopped`.
    ///
    /// Individual persist failures are logged and collected in the report;
    /// they do not abort the remaining kinds.
    pub fn stop(&self) -> StoreResult<ShutdownReport> {
        let started_at = Instant::now();
        {
            let mut phase = self.write_phase();
            if *phase != StorePhase::Ready {
                return Err(self.reject_transition(*phase, "stop"));
            }
            self.gate.set_open(false);
            *phase = StorePhase::ShuttingDown;
        }
        info!("event=store_stop module=store status=start");

        let mut report = ShutdownReport::default();
        for kind in EntityKind::ALL {
            match self.save_kind(kind) {
                Ok(count) => report.persisted.push((kind, count)),
                Err(err) => report.failures.push(err),
            }
        }

        *self.write_phase() = StorePhase::Stopped;
        if report.is_clean() {
            info!(
                "event=store_stop module=store status=ok kinds={} duration_ms={}",
                report.persisted.len(),
                started_at.elapsed().as_millis()
            );
        } else {
            error!(
                "event=store_stop module=store status=error persisted={} failed={} duration_ms={}",
                report.persisted.len(),
                report.failures.len(),
                started_at.elapsed().as_millis()
            );
        }
        Ok(report)
    }

    pub fn accounts(&self) -> StoreResult<&AccountRepository> {
        self.require_ready().map(|()| &self.accounts)
    }

    pub fn profiles(&self) -> StoreResult<&ProfileRepository> {
        self.require_ready().map(|()| &self.profiles)
    }

    pub fn diets(&self) -> StoreResult<&DietRepository> {
        self.require_ready().map(|()| &self.diets)
    }

    pub fn posts(&self) -> StoreResult<&PostRepository> {
        self.require_ready().map(|()| &self.posts)
    }

    pub fn follows(&self) -> StoreResult<&FollowRepository> {
        self.require_ready().map(|()| &self.follows)
    }

    pub fn challenges(&self) -> StoreResult<&ChallengeRepository> {
        self.require_ready().map(|()| &self.challenges)
    }

    pub fn exercises(&self) -> StoreResult<&ExerciseRepository> {
        self.require_ready().map(|()| &self.exercises)
    }

    pub fn participants(&self) -> StoreResult<&ParticipantRepository> {
        self.require_ready().map(|()| &self.participants)
    }

    pub fn save_accounts(&self) -> StoreResult<usize> {
        self.persist(EntityKind::Account)
    }

    pub fn save_profiles(&self) -> StoreResult<usize> {
        self.persist(EntityKind::Profile)
    }

    pub fn save_diets(&self) -> StoreResult<usize> {
        self.persist(EntityKind::Diet)
    }

    pub fn save_posts(&self) -> StoreResult<usize> {
        self.persist(EntityKind::Post)
    }

    pub fn save_follows(&self) -> StoreResult<usize> {
        self.persist(EntityKind::Follow)
    }

    pub fn save_challenges(&self) -> StoreResult<usize> {
        self.persist(EntityKind::Challenge)
    }

    pub fn save_exercises(&self) -> StoreResult<usize> {
        self.persist(EntityKind::Exercise)
    }

    pub fn save_participants(&self) -> StoreResult<usize> {
        self.persist(EntityKind::Participant)
    }

    /// Record count per kind. Only available in `Ready`.
    pub fn counts(&self) -> StoreResult<Vec<(EntityKind, usize)>> {
        self.require_ready()?;
        Ok(EntityKind::ALL
            .into_iter()
            .map(|kind| (kind, self.len_of(kind)))
            .collect())
    }

    fn load_all(&self, dir: &Path) -> Result<(), RepoError> {
        self.accounts.load_from(dir)?;
        self.profiles.load_from(dir)?;
        self.diets.load_from(dir)?;
        self.posts.load_from(dir)?;
        self.follows.load_from(dir)?;
        self.challenges.load_from(dir)?;
        self.exercises.load_from(dir)?;
        self.participants.load_from(dir)?;
        Ok(())
    }

    fn persist(&self, kind: EntityKind) -> StoreResult<usize> {
        let phase = self.phase();
        if !matches!(phase, StorePhase::Ready | StorePhase::ShuttingDown) {
            error!(
                "event=store_persist module=store status=error kind={kind} error_code=not_ready phase={phase}"
            );
            return Err(StoreError::NotReady(phase));
        }
        self.save_kind(kind).map_err(StoreError::Persist)
    }

    fn save_kind(&self, kind: EntityKind) -> Result<usize, RepoError> {
        match kind {
            EntityKind::Account => self.accounts.save_to_disk(),
            EntityKind::Profile => self.profiles.save_to_disk(),
            EntityKind::Diet => self.diets.save_to_disk(),
            EntityKind::Post => self.posts.save_to_disk(),
            EntityKind::Follow => self.follows.save_to_disk(),
            EntityKind::Challenge => self.challenges.save_to_disk(),
            EntityKind::Exercise => self.exercises.save_to_disk(),
            EntityKind::Participant => self.participants.save_to_disk(),
        }
    }

    fn len_of(&self, kind: EntityKind) -> usize {
        match kind {
            EntityKind::Account => self.accounts.len(),
            EntityKind::Profile => self.profiles.len(),
            EntityKind::Diet => self.diets.len(),
            EntityKind::Post => self.posts.len(),
            EntityKind::Follow => self.follows.len(),
            EntityKind::Challenge => self.challenges.len(),
            EntityKind::Exercise => self.exercises.len(),
            EntityKind::Participant => self.participants.len(),
        }
    }

    fn require_ready(&self) -> StoreResult<()> {
        let phase = self.phase();
        if phase == StorePhase::Ready {
            return Ok(());
        }
        error!("event=store_access module=store status=error error_code=not_ready phase={phase}");
        Err(StoreError::NotReady(phase))
    }

    fn reject_transition(&self, from: StorePhase, action: &'static str) -> StoreError {
        error!(
            "event=store_transition module=store status=error action={action} phase={from}"
        );
        StoreError::InvalidTransition { from, action }
    }

    fn read_phase(&self) -> RwLockReadGuard<'_, StorePhase> {
        self.phase.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_phase(&self) -> RwLockWriteGuard<'_, StorePhase> {
        self.phase.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::{DataStore, StoreError, StorePhase};

    #[test]
    fn new_store_rejects_access_and_stop() {
        let store = DataStore::new();
        assert_eq!(store.phase(), StorePhase::Uninitialized);
        assert!(matches!(
            store.diets(),
            Err(StoreError::NotReady(StorePhase::Uninitialized))
        ));
        assert!(matches!(
            store.stop(),
            Err(StoreError::InvalidTransition {
                from: StorePhase::Uninitialized,
                action: "stop"
            })
        ));
        assert!(matches!(store.save_posts(), Err(StoreError::NotReady(_))));
    }

    #[test]
    fn phase_names_are_stable() {
        assert_eq!(StorePhase::ShuttingDown.to_string(), "shutting_down");
    }
}
