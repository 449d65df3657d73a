//! Account and profile records.
//!
//! # Invariants
//! - Account emails are syntactically valid; uniqueness is checked above the store.
//! - A profile may share its id with the account it describes.

use super::entity::{
    require_email, require_non_blank, Entity, EntityId, EntityKind, IdPolicy, ValidationError,
};
use serde::{Deserialize, Serialize};

/// Login identity for one coaching app user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    pub email: String,
    pub nickname: String,
    /// Opaque credential digest. Never logged.
    #[serde(default)]
    pub password_hash: String,
}

impl Account {
    pub fn new(email: impl Into<String>, nickname: impl Into<String>) -> Self {
        Self {
            id: None,
            email: email.into(),
            nickname: nickname.into(),
            password_hash: String::new(),
        }
    }
}

impl Entity for Account {
    const KIND: EntityKind = EntityKind::Account;

    fn id(&self) -> Option<EntityId> {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = Some(id);
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_email(Self::KIND, "email", &self.email)?;
        require_non_blank(Self::KIND, "nickname", &self.nickname)
    }
}

/// Body metrics and coaching goal attached to an account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    pub account_id: EntityId,
    #[serde(default)]
    pub height_cm: Option<f64>,
    #[serde(default)]
    pub weight_kg: Option<f64>,
    #[serde(default)]
    pub goal: String,
    #[serde(default)]
    pub bio: String,
}

impl Profile {
    pub fn new(account_id: EntityId) -> Self {
        Self {
            id: None,
            account_id,
            height_cm: None,
            weight_kg: None,
            goal: String::new(),
            bio: String::new(),
        }
    }
}

impl Entity for Profile {
    const KIND: EntityKind = EntityKind::Profile;
    const ID_POLICY: IdPolicy = IdPolicy::Explicit;

    fn id(&self) -> Option<EntityId> {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = Some(id);
    }

    fn validate(&self) -> Result<(), ValidationError> {
        for (field, value) in [("height_cm", self.height_cm), ("weight_kg", self.weight_kg)] {
            if let Some(value) = value {
                if !value.is_finite() || value <= 0.0 {
                    return Err(ValidationError::new(
                        Self::KIND,
                        field,
                        "must be a positive number",
                    ));
                }
            }
        }
        Ok(())
    }
}
