mod db;
pub mod models;

pub use db::GoalDatabase;
pub use models::{Goal, Task};

use anyhow::Result;

use crate::config::DatabaseConfig;
use crate::decomposition::GoalBreakdown;

/// Goal persistence scoped by owner (the session id)
pub struct GoalStore {
    db: GoalDatabase,
}

impl GoalStore {
    pub fn new(db: GoalDatabase) -> Self {
        Self { db }
    }

    /// Open the store at the configured location
    pub async fn open(config: &DatabaseConfig) -> Result<Self> {
        let path = config.resolved_path()?;
        tracing::info!("Opening goal database at {}", path.display());
        Ok(Self::new(GoalDatabase::open(&path).await?))
    }

    pub async fn in_memory() -> Result<Self> {
        Ok(Self::new(GoalDatabase::in_memory().await?))
    }

    /// Save a goal with its breakdown; tasks get order 1..=5
    pub async fn create_goal(
        &self,
        owner: &str,
        goal_text: &str,
        breakdown: &GoalBreakdown,
    ) -> Result<Goal> {
        self.db
            .insert_goal(
                owner,
                goal_text,
                i64::from(breakdown.complexity_score.get()),
                &breakdown.tasks,
            )
            .await
    }

    pub async fn list_goals(&self, owner: &str, skip: i64, limit: i64) -> Result<Vec<Goal>> {
        self.db.list_goals(owner, skip, limit).await
    }

    pub async fn get_goal(&self, owner: &str, id: i64) -> Result<Option<Goal>> {
        self.db.get_goal(owner, id).await
    }

    pub async fn delete_goal(&self, owner: &str, id: i64) -> Result<bool> {
        self.db.delete_goal(owner, id).await
    }

    /// Drop all goals and tasks and recreate the schema
    pub async fn reset(&self) -> Result<()> {
        self.db.reset().await
    }
}
