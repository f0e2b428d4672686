use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stored goal with its ordered steps
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Goal {
    pub id: i64,
    pub user_id: String, // session id of the owner
    pub goal_text: String,
    pub complexity_score: i64,
    pub created_at: DateTime<Utc>,
    pub tasks: Vec<Task>,
}

/// One step of a goal; `order` runs 1..=5
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub goal_id: i64,
    pub task_text: String,
    pub order: i64,
    pub created_at: DateTime<Utc>,
}
