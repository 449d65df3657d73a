//! Challenge records and their participants.

use super::entity::{require_date, require_non_blank, Entity, EntityId, EntityKind, ValidationError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Challenge {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub goal_days: u32,
    /// `YYYY-MM-DD`.
    pub start_date: String,
    /// `YYYY-MM-DD`, not earlier than `start_date`.
    pub end_date: String,
}

impl Entity for Challenge {
    const KIND: EntityKind = EntityKind::Challenge;

    fn id(&self) -> Option<EntityId> {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = Some(id);
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_non_blank(Self::KIND, "title", &self.title)?;
        if self.goal_days == 0 {
            return Err(ValidationError::new(
                Self::KIND,
                "goal_days",
                "must be at least 1",
            ));
        }
        require_date(Self::KIND, "start_date", &self.start_date)?;
        require_date(Self::KIND, "end_date", &self.end_date)?;
        // Zero-padded ISO dates order lexicographically.
        if self.end_date < self.start_date {
            return Err(ValidationError::new(
                Self::KIND,
                "end_date",
                "must not be earlier than start_date",
            ));
        }
        Ok(())
    }
}

/// Membership of one account in one challenge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeParticipant {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    pub challenge_id: EntityId,
    pub account_id: EntityId,
    #[serde(default)]
    pub progress_days: u32,
}

impl ChallengeParticipant {
    pub fn new(challenge_id: EntityId, account_id: EntityId) -> Self {
        Self {
            id: None,
            challenge_id,
            account_id,
            progress_days: 0,
        }
    }
}

impl Entity for ChallengeParticipant {
    const KIND: EntityKind = EntityKind::Participant;

    fn id(&self) -> Option<EntityId> {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = Some(id);
    }

    fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::Challenge;
    use crate::model::entity::Entity;

    fn challenge(start: &str, end: &str, goal_days: u32) -> Challenge {
        Challenge {
            id: None,
            title: "30 day walk".to_string(),
            description: String::new(),
            goal_days,
            start_date: start.to_string(),
            end_date: end.to_string(),
        }
    }

    #[test]
    fn challenge_range_must_be_ordered() {
        assert!(challenge("2024-03-01", "2024-03-30", 30).validate().is_ok());
        assert_eq!(
            challenge("2024-03-30", "2024-03-01", 30)
                .validate()
                .unwrap_err()
                .field,
            "end_date"
        );
        assert_eq!(
            challenge("2024-03-01", "2024-03-30", 0)
                .validate()
                .unwrap_err()
                .field,
            "goal_days"
        );
    }
}
