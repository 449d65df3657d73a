//! Post and follow narrow queries/mutators.

use crate::codec::Codec;
use crate::model::entity::EntityId;
use crate::model::social::{Follow, Post};
use crate::repo::file_repo::{FileRepository, RepoResult};

impl<C: Codec<Post>> FileRepository<Post, C> {
    pub fn find_by_author(&self, author_id: EntityId) -> Vec<Post> {
        self.find_where(|post| post.author_id == author_id)
    }
}

impl<C: Codec<Follow>> FileRepository<Follow, C> {
    /// Edges pointing at `account_id`.
    pub fn followers_of(&self, account_id: EntityId) -> Vec<Follow> {
        self.find_where(|follow| follow.followee_id == account_id)
    }

    /// Edges starting at `account_id`.
    pub fn following_of(&self, account_id: EntityId) -> Vec<Follow> {
        self.find_where(|follow| follow.follower_id == account_id)
    }

    pub fn is_following(&self, follower_id: EntityId, followee_id: EntityId) -> bool {
        !self
            .find_where(|follow| {
                follow.follower_id == follower_id && follow.followee_id == followee_id
            })
            .is_empty()
    }

    /// Removes every edge `follower_id -> followee_id`. Returns whether any existed.
    pub fn unfollow(&self, follower_id: EntityId, followee_id: EntityId) -> RepoResult<bool> {
        let removed = self.delete_where(|follow| {
            follow.follower_id == follower_id && follow.followee_id == followee_id
        })?;
        Ok(removed > 0)
    }
}
