//! Repository layer: one in-memory collection per entity kind.
//!
//! # Responsibility
//! - Provide the generic CRUD contract (`Repository`) and its file-backed
//!   implementation.
//! - Add kind-specific narrow mutators as thin extensions of the generic type.
//!
//! # Invariants
//! - Request-path operations never touch disk.
//! - Write paths enforce `Entity::validate()` before mutating a collection.

pub mod activity_repo;
pub mod challenge_repo;
pub mod file_repo;
pub mod social_repo;

use crate::model::account::{Account, Profile};
use crate::model::challenge::{Challenge, ChallengeParticipant};
use crate::model::diet::{DietRecord, Exercise};
use crate::model::social::{Follow, Post};
use file_repo::FileRepository;

pub type AccountRepository = FileRepository<Account>;
pub type ProfileRepository = FileRepository<Profile>;
pub type DietRepository = FileRepository<DietRecord>;
pub type PostRepository = FileRepository<Post>;
pub type FollowRepository = FileRepository<Follow>;
pub type ChallengeRepository = FileRepository<Challenge>;
pub type ExerciseRepository = FileRepository<Exercise>;
pub type ParticipantRepository = FileRepository<ChallengeParticipant>;
