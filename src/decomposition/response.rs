//! Normalization and structural validation of backend output

use serde_json::Value;

use super::{ComplexityScore, ContractError, GoalBreakdown, TASK_COUNT};

/// Strip one optional leading "```json" or "```" fence and one optional
/// trailing "```" fence, trimming whitespace after each step.
///
/// Unfenced input comes back trimmed and otherwise unchanged.
pub fn strip_code_fences(raw: &str) -> &str {
    let mut text = raw.trim();

    if let Some(rest) = text.strip_prefix("```json") {
        text = rest.trim();
    }
    if let Some(rest) = text.strip_prefix("```") {
        text = rest.trim();
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest.trim();
    }

    text
}

/// Parse backend output into a breakdown, all-or-nothing.
pub fn parse_and_validate(raw: &str) -> Result<GoalBreakdown, ContractError> {
    let value: Value = serde_json::from_str(strip_code_fences(raw))?;

    let object = value.as_object().ok_or(ContractError::NotAnObject)?;

    let tasks = object
        .get("tasks")
        .ok_or(ContractError::MissingKey("tasks"))?;
    let score = object
        .get("complexity_score")
        .ok_or(ContractError::MissingKey("complexity_score"))?;

    let tasks = tasks.as_array().ok_or(ContractError::TasksNotArray)?;
    if tasks.len() != TASK_COUNT {
        return Err(ContractError::WrongTaskCount(tasks.len()));
    }

    let tasks: Vec<String> = tasks
        .iter()
        .enumerate()
        .map(|(index, task)| {
            task.as_str()
                .map(str::to_string)
                .ok_or(ContractError::TaskNotString(index))
        })
        .collect::<Result<_, _>>()?;

    let complexity_score = parse_score(score)?;

    let tasks: [String; TASK_COUNT] = tasks
        .try_into()
        .map_err(|tasks: Vec<String>| ContractError::WrongTaskCount(tasks.len()))?;

    Ok(GoalBreakdown {
        tasks,
        complexity_score,
    })
}

fn parse_score(score: &Value) -> Result<ComplexityScore, ContractError> {
    let number = score.as_number().ok_or(ContractError::ScoreNotNumeric)?;

    let value = if let Some(value) = number.as_i64() {
        value
    } else {
        // Accept 3.0 but not 3.5; u64 values beyond i64 land here too.
        let float = number.as_f64().ok_or(ContractError::ScoreNotNumeric)?;
        if float.fract() != 0.0 || !float.is_finite() {
            return Err(ContractError::ScoreNotInteger(float));
        }
        if float < i64::MIN as f64 || float > i64::MAX as f64 {
            return Err(ContractError::ScoreOutOfRange(i64::MAX));
        }
        float as i64
    };

    ComplexityScore::new(value)
}
