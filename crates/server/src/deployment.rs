//! Shared application state handed to every route.

use std::sync::Arc;

use db::DBService;
use services::services::{
    claude_api::ClaudeApiClient,
    events::EventService,
    family::FamilyService,
    goals::GoalService,
    insights::{InsightService, TextGenerator, UnconfiguredGenerator},
    journal::JournalService,
    profile::ProfileService,
    progress::ProgressService,
    routine::RoutineService,
};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::ServerConfig;

#[derive(Clone)]
pub struct Deployment {
    db: DBService,
    events: EventService,
    routine: RoutineService,
    goals: GoalService,
    journal: JournalService,
    family: FamilyService,
    profile: ProfileService,
    progress: ProgressService,
    insights: InsightService,
    shutdown: CancellationToken,
}

impl Deployment {
    /// Connects to the configured database and picks the text generator.
    pub async fn from_config(config: &ServerConfig) -> Result<Self, sqlx::Error> {
        let db = DBService::new(&config.database_url).await?;
        let generator: Arc<dyn TextGenerator> = match &config.anthropic_api_key {
            Some(key) => match ClaudeApiClient::new(key.clone(), config.anthropic_model.clone()) {
                Ok(client) => {
                    info!(model = client.model(), "AI insights enabled");
                    Arc::new(client)
                }
                Err(e) => {
                    warn!(error = %e, "Could not build the Claude client; AI insights disabled");
                    Arc::new(UnconfiguredGenerator)
                }
            },
            None => {
                warn!("ANTHROPIC_API_KEY not set; AI insights disabled");
                Arc::new(UnconfiguredGenerator)
            }
        };
        Ok(Self::new(db, generator, config))
    }

    pub fn new(db: DBService, generator: Arc<dyn TextGenerator>, config: &ServerConfig) -> Self {
        let pool = db.pool.clone();
        let events = EventService::default();
        let insights = InsightService::new(generator, config.quote_language.clone());
        let routine = RoutineService::new(pool.clone(), events.clone(), config.notes_debounce);

        Self {
            goals: GoalService::new(pool.clone(), events.clone()),
            journal: JournalService::new(pool.clone(), events.clone(), insights.clone()),
            family: FamilyService::new(pool.clone(), events.clone()),
            profile: ProfileService::new(pool.clone(), events.clone(), routine.clone()),
            progress: ProgressService::new(pool, routine.clone()),
            routine,
            insights,
            events,
            db,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn db(&self) -> &DBService {
        &self.db
    }

    pub fn events(&self) -> &EventService {
        &self.events
    }

    pub fn routine(&self) -> &RoutineService {
        &self.routine
    }

    pub fn goals(&self) -> &GoalService {
        &self.goals
    }

    pub fn journal(&self) -> &JournalService {
        &self.journal
    }

    pub fn family(&self) -> &FamilyService {
        &self.family
    }

    pub fn profile(&self) -> &ProfileService {
        &self.profile
    }

    pub fn progress(&self) -> &ProgressService {
        &self.progress
    }

    pub fn insights(&self) -> &InsightService {
        &self.insights
    }

    /// Cancelled when the server starts shutting down; long-lived responses end on it.
    pub fn shutdown(&self) -> &CancellationToken {
        &self.shutdown
    }
}
