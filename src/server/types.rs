//! Server types and DTOs
//!
//! Request and response bodies for the goal API. Field names match what the
//! web client reads (`detail` on errors, `order` on tasks).

use serde::{Deserialize, Serialize};

use crate::persistence::{Goal, Task};

/// Longest accepted goal, in characters
pub const MAX_GOAL_CHARS: usize = 500;

/// Largest page served by the list endpoint
pub const MAX_LIST_LIMIT: i64 = 100;

/// Check a goal's length (1..=500 characters)
pub fn validate_goal_text(goal_text: &str) -> Result<(), String> {
    let chars = goal_text.chars().count();
    if chars == 0 {
        Err("goal_text must not be empty".to_string())
    } else if chars > MAX_GOAL_CHARS {
        Err(format!(
            "goal_text must be at most {} characters (got {})",
            MAX_GOAL_CHARS, chars
        ))
    } else {
        Ok(())
    }
}

// ============================================================================
// Request/Response DTOs
// ============================================================================

/// Request to create a new goal
#[derive(Debug, Deserialize)]
pub struct CreateGoalRequest {
    pub goal_text: String,
}

/// Paging parameters for the goal list
#[derive(Debug, Default, Deserialize)]
pub struct ListGoalsQuery {
    #[serde(default)]
    pub skip: Option<i64>,
    #[serde(default)]
    pub limit: Option<i64>,
}

impl ListGoalsQuery {
    /// (skip, limit) with defaults applied and bounds enforced
    pub fn bounds(&self) -> (i64, i64) {
        let skip = self.skip.unwrap_or(0).max(0);
        let limit = self.limit.unwrap_or(MAX_LIST_LIMIT).clamp(0, MAX_LIST_LIMIT);
        (skip, limit)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TaskResponse {
    pub id: i64,
    pub task_text: String,
    pub order: i64,
    pub created_at: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GoalResponse {
    pub id: i64,
    pub goal_text: String,
    pub complexity_score: i64,
    pub created_at: String,
    pub tasks: Vec<TaskResponse>,
}

impl From<Task> for TaskResponse {
    fn from(task: Task) -> Self {
        Self {
            id: task.id,
            task_text: task.task_text,
            order: task.order,
            created_at: task.created_at.to_rfc3339(),
        }
    }
}

impl From<Goal> for GoalResponse {
    fn from(goal: Goal) -> Self {
        let mut tasks: Vec<TaskResponse> = goal.tasks.into_iter().map(TaskResponse::from).collect();
        tasks.sort_by_key(|task| task.order);

        Self {
            id: goal.id,
            goal_text: goal.goal_text,
            complexity_score: goal.complexity_score,
            created_at: goal.created_at.to_rfc3339(),
            tasks,
        }
    }
}

/// Response for a successful delete
#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteGoalResponse {
    pub message: String,
}

/// Service banner served at `/`
#[derive(Debug, Serialize)]
pub struct ServiceInfo {
    pub message: String,
    pub version: String,
    pub endpoints: serde_json::Value,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Config response
#[derive(Debug, Serialize)]
pub struct ConfigResponse {
    pub provider: String,
    pub model: String,
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
    pub code: String,
}
