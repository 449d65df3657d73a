//! File-backed entity store for the YumYum coaching app.
//! Keeps every entity collection in memory and snapshots it to one file per
//! kind across restarts.

pub mod codec;
pub mod config;
pub mod logging;
pub mod model;
pub mod repo;
pub mod store;

pub use codec::{Codec, CodecError, JsonCodec};
pub use config::StoreConfig;
pub use logging::{default_log_level, init_logging, init_logging_from, logging_status, LoggingError};
pub use model::account::{Account, Profile};
pub use model::challenge::{Challenge, ChallengeParticipant};
pub use model::diet::{DietRecord, Exercise, FoodItem, MealType};
pub use model::entity::{Entity, EntityId, EntityKind, IdPolicy, ValidationError};
pub use model::social::{Follow, Post};
pub use repo::file_repo::{FileRepository, RepoError, RepoResult, Repository};
pub use repo::{
    AccountRepository, ChallengeRepository, DietRepository, ExerciseRepository,
    FollowRepository, ParticipantRepository, PostRepository, ProfileRepository,
};
pub use store::bootstrap::{
    resolve_data_directory, seed_source_for, BootstrapError, DirectorySeed, EmbeddedSeed,
    SeedReport, SeedSource,
};
pub use store::{DataStore, ShutdownReport, StoreError, StorePhase, StoreResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
