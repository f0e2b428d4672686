//! Goal decomposition
//!
//! Turns a free-text goal into exactly five ordered steps and a 1-10
//! complexity score using a generative-text backend. Every failure along the
//! way (backend error, timeout, unparsable or malformed output) collapses to
//! one fixed fallback breakdown, so callers always get a valid result.

mod prompt;
mod response;

pub use prompt::build_prompt;
pub use response::{parse_and_validate, strip_code_fences};

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::llm::LlmClient;

/// Number of steps in every breakdown
pub const TASK_COUNT: usize = 5;

pub const MIN_COMPLEXITY: u8 = 1;
pub const MAX_COMPLEXITY: u8 = 10;

const FALLBACK_TASKS: [&str; TASK_COUNT] = [
    "Research and gather information about this goal",
    "Create a detailed plan with milestones",
    "Set up necessary resources and tools",
    "Take the first actionable step",
    "Monitor progress and adjust as needed",
];

const FALLBACK_COMPLEXITY: u8 = 5;

/// Complexity rating, always within 1..=10
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ComplexityScore(u8);

impl ComplexityScore {
    pub fn new(value: i64) -> Result<Self, ContractError> {
        if (MIN_COMPLEXITY as i64..=MAX_COMPLEXITY as i64).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(ContractError::ScoreOutOfRange(value))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl<'de> Deserialize<'de> for ComplexityScore {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = i64::deserialize(deserializer)?;
        ComplexityScore::new(value).map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for ComplexityScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Five ordered steps plus a complexity score
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalBreakdown {
    pub tasks: [String; TASK_COUNT],
    pub complexity_score: ComplexityScore,
}

impl GoalBreakdown {
    /// Generic breakdown used whenever backend output cannot be trusted
    pub fn fallback() -> Self {
        Self {
            tasks: FALLBACK_TASKS.map(str::to_string),
            complexity_score: ComplexityScore(FALLBACK_COMPLEXITY),
        }
    }

    pub fn is_fallback(&self) -> bool {
        *self == Self::fallback()
    }
}

/// Failure to obtain text from the backend
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("backend request failed: {0}")]
    Request(String),

    #[error("backend did not answer within {0:?}")]
    Timeout(Duration),

    #[error("backend returned an empty completion")]
    EmptyResponse,
}

/// Backend text that does not satisfy the breakdown contract
#[derive(Debug, Error)]
pub enum ContractError {
    #[error("response is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("response is not a JSON object")]
    NotAnObject,

    #[error("response is missing the `{0}` key")]
    MissingKey(&'static str),

    #[error("`tasks` is not an array")]
    TasksNotArray,

    #[error("expected exactly {} tasks, got {0}", TASK_COUNT)]
    WrongTaskCount(usize),

    #[error("task {0} is not a string")]
    TaskNotString(usize),

    #[error("`complexity_score` is not a number")]
    ScoreNotNumeric,

    #[error("`complexity_score` {0} is not a whole number")]
    ScoreNotInteger(f64),

    #[error("`complexity_score` {0} is outside {}..={}", MIN_COMPLEXITY, MAX_COMPLEXITY)]
    ScoreOutOfRange(i64),
}

#[derive(Debug, Error)]
pub enum DecompositionError {
    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Contract(#[from] ContractError),
}

/// Breaks goals down through an injected backend client
#[derive(Clone)]
pub struct GoalDecomposer {
    client: Arc<dyn LlmClient>,
    timeout: Duration,
}

impl GoalDecomposer {
    pub fn new(client: Arc<dyn LlmClient>, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    pub fn model(&self) -> &str {
        self.client.model()
    }

    /// Break down a goal. Never fails: any error yields the fallback.
    pub async fn decompose(&self, goal_text: &str) -> GoalBreakdown {
        match self.try_decompose(goal_text).await {
            Ok(breakdown) => breakdown,
            Err(e) => {
                tracing::warn!("Goal breakdown failed, using fallback: {}", e);
                GoalBreakdown::fallback()
            }
        }
    }

    /// Break down a goal, surfacing the reason when it cannot be done
    pub async fn try_decompose(&self, goal_text: &str) -> Result<GoalBreakdown, DecompositionError> {
        let prompt = build_prompt(goal_text);
        let raw = self.call_backend(&prompt).await?;

        parse_and_validate(&raw).map_err(|e| {
            tracing::debug!("Rejected backend output: {}", truncate(&raw, 200));
            DecompositionError::from(e)
        })
    }

    async fn call_backend(&self, prompt: &str) -> Result<String, BackendError> {
        let response = tokio::time::timeout(self.timeout, self.client.generate(prompt))
            .await
            .map_err(|_| BackendError::Timeout(self.timeout))?
            .map_err(|e| BackendError::Request(format!("{:#}", e)))?;

        if let Some(usage) = &response.usage {
            tracing::debug!(
                "Backend usage: {} input tokens, {} output tokens",
                usage.input_tokens,
                usage.output_tokens
            );
        }

        if response.text.trim().is_empty() {
            return Err(BackendError::EmptyResponse);
        }

        Ok(response.text)
    }
}

fn truncate(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}
