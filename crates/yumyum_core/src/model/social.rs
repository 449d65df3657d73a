//! Community records: posts and follow edges.
//!
//! Author and follower ids reference accounts, but the store does not check
//! that the referenced account exists.

use super::entity::{require_non_blank, Entity, EntityId, EntityKind, ValidationError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    pub author_id: EntityId,
    pub title: String,
    #[serde(default)]
    pub content: String,
    /// Unix epoch milliseconds.
    #[serde(default)]
    pub created_at_ms: i64,
}

impl Entity for Post {
    const KIND: EntityKind = EntityKind::Post;

    fn id(&self) -> Option<EntityId> {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = Some(id);
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_non_blank(Self::KIND, "title", &self.title)
    }
}

/// Directed edge: `follower_id` follows `followee_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Follow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    pub follower_id: EntityId,
    pub followee_id: EntityId,
}

impl Follow {
    pub fn new(follower_id: EntityId, followee_id: EntityId) -> Self {
        Self {
            id: None,
            follower_id,
            followee_id,
        }
    }
}

impl Entity for Follow {
    const KIND: EntityKind = EntityKind::Follow;

    fn id(&self) -> Option<EntityId> {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = Some(id);
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if self.follower_id == self.followee_id {
            return Err(ValidationError::new(
                Self::KIND,
                "followee_id",
                "an account cannot follow itself",
            ));
        }
        Ok(())
    }
}
