//! Signed-in user's profile.

use db::models::user::{UpsertUserProfile, UserProfile};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::info;

use super::{
    events::{ChangeEvent, ChangeOp, Collection, EventService},
    routine::{RoutineError, RoutineService},
};

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error(transparent)]
    Routine(#[from] RoutineError),
    #[error("profile not found")]
    NotFound,
}

#[derive(Clone)]
pub struct ProfileService {
    pool: SqlitePool,
    events: EventService,
    routine: RoutineService,
}

impl ProfileService {
    pub fn new(pool: SqlitePool, events: EventService, routine: RoutineService) -> Self {
        Self {
            pool,
            events,
            routine,
        }
    }

    /// Records the sign-in. A first sign-in also gives the user the default routine.
    pub async fn sign_in(
        &self,
        user_id: &str,
        data: UpsertUserProfile,
    ) -> Result<UserProfile, ProfileError> {
        let existed = UserProfile::find_by_id(&self.pool, user_id).await?.is_some();
        let profile = UserProfile::upsert(&self.pool, user_id, &data).await?;

        let op = if existed {
            ChangeOp::Updated
        } else {
            info!(user_id = %user_id, "New user profile");
            self.routine.seed_default_tasks(user_id).await?;
            ChangeOp::Created
        };
        self.events
            .publish(ChangeEvent::new(user_id, Collection::Profile, user_id, op));
        Ok(profile)
    }

    pub async fn get(&self, user_id: &str) -> Result<UserProfile, ProfileError> {
        UserProfile::find_by_id(&self.pool, user_id)
            .await?
            .ok_or(ProfileError::NotFound)
    }
}
