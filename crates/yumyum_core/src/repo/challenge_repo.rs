//! Challenge participant narrow queries/mutators.

use crate::codec::Codec;
use crate::model::challenge::ChallengeParticipant;
use crate::model::entity::EntityId;
use crate::repo::file_repo::{FileRepository, RepoResult};

impl<C: Codec<ChallengeParticipant>> FileRepository<ChallengeParticipant, C> {
    pub fn find_by_challenge(&self, challenge_id: EntityId) -> Vec<ChallengeParticipant> {
        self.find_where(|participant| participant.challenge_id == challenge_id)
    }

    pub fn find_by_account(&self, account_id: EntityId) -> Vec<ChallengeParticipant> {
        self.find_where(|participant| participant.account_id == account_id)
    }

    /// Adds one completed day; returns the new total, or `None` when absent.
    pub fn record_progress(&self, participant_id: EntityId) -> RepoResult<Option<u32>> {
        self.update_with(participant_id, |participant| {
            participant.progress_days = participant.progress_days.saturating_add(1);
            participant.progress_days
        })
    }
}
