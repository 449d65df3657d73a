//! Shared entity contract for every persisted record kind.
//!
//! # Responsibility
//! - Define the identity and validation hooks the generic repository needs.
//! - Name each entity kind and the file stem its snapshot is stored under.
//!
//! # Invariants
//! - A stored entity always carries `Some(id)`; `None` only exists before the
//!   first successful `save`.
//! - `validate()` is pure and never mutates the record.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

static DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})-(\d{2})-(\d{2})$").expect("valid date regex"));
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex")
});

/// Primary key shared by all entity kinds. Unique within one collection only.
pub type EntityId = u64;

/// The eight record kinds persisted by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    Account,
    Profile,
    Diet,
    Post,
    Follow,
    Challenge,
    Exercise,
    Participant,
}

impl EntityKind {
    /// Every kind, in the order the store loads and persists them.
    pub const ALL: [EntityKind; 8] = [
        EntityKind::Account,
        EntityKind::Profile,
        EntityKind::Diet,
        EntityKind::Post,
        EntityKind::Follow,
        EntityKind::Challenge,
        EntityKind::Exercise,
        EntityKind::Participant,
    ];

    /// Stable lowercase name used in log events.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Account => "account",
            Self::Profile => "profile",
            Self::Diet => "diet",
            Self::Post => "post",
            Self::Follow => "follow",
            Self::Challenge => "challenge",
            Self::Exercise => "exercise",
            Self::Participant => "participant",
        }
    }

    /// Backing file name without extension.
    pub fn file_stem(self) -> &'static str {
        match self {
            Self::Account => "accounts",
            Self::Profile => "profiles",
            Self::Diet => "diets",
            Self::Post => "posts",
            Self::Follow => "follows",
            Self::Challenge => "challenges",
            Self::Exercise => "exercises",
            Self::Participant => "participants",
        }
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How `save` treats an explicit id that is not yet in the collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdPolicy {
    /// Unknown ids are discarded and a fresh counter id is assigned.
    Fresh,
    /// Unknown ids are kept; the counter is bumped past them.
    Explicit,
}

/// Contract implemented by every record kind stored in a repository.
pub trait Entity: Clone + Serialize + DeserializeOwned + Send + 'static {
    const KIND: EntityKind;
    const ID_POLICY: IdPolicy = IdPolicy::Fresh;

    fn id(&self) -> Option<EntityId>;
    fn set_id(&mut self, id: EntityId);

    /// Rejects malformed attribute values before they reach the collection.
    fn validate(&self) -> Result<(), ValidationError>;
}

/// Field-level validation failure reported back to the caller of `save`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub kind: EntityKind,
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(kind: EntityKind, field: &'static str, message: impl Into<String>) -> Self {
        Self {
            kind,
            field,
            message: message.into(),
        }
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid {} field `{}`: {}", self.kind, self.field, self.message)
    }
}

impl Error for ValidationError {}

pub(crate) fn require_non_blank(
    kind: EntityKind,
    field: &'static str,
    value: &str,
) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new(kind, field, "must not be blank"));
    }
    Ok(())
}

/// Accepts `YYYY-MM-DD` with month in 1..=12 and day in 1..=31.
pub(crate) fn require_date(
    kind: EntityKind,
    field: &'static str,
    value: &str,
) -> Result<(), ValidationError> {
    let invalid = || ValidationError::new(kind, field, format!("`{value}` is not YYYY-MM-DD"));
    let captures = DATE_RE.captures(value).ok_or_else(invalid)?;
    let month: u32 = captures[2].parse().map_err(|_| invalid())?;
    let day: u32 = captures[3].parse().map_err(|_| invalid())?;
    if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return Err(invalid());
    }
    Ok(())
}

pub(crate) fn require_email(
    kind: EntityKind,
    field: &'static str,
    value: &str,
) -> Result<(), ValidationError> {
    if !EMAIL_RE.is_match(value.trim()) {
        return Err(ValidationError::new(
            kind,
            field,
            format!("`{value}` is not an email address"),
        ));
    }
    Ok(())
}
