//! Instruction sent to the backend for a goal breakdown

use super::TASK_COUNT;

/// Build the breakdown instruction with `goal_text` embedded verbatim.
///
/// The goal is spliced in as-is between quotes; nothing in it is interpreted
/// as template syntax.
pub fn build_prompt(goal_text: &str) -> String {
    let mut prompt = String::with_capacity(PROMPT_HEAD.len() + PROMPT_TAIL.len() + goal_text.len() + 16);
    prompt.push_str(PROMPT_HEAD);
    prompt.push_str("\n\nGoal: \"");
    prompt.push_str(goal_text);
    prompt.push_str("\"\n\n");
    prompt.push_str(PROMPT_TAIL);
    prompt
}

const PROMPT_HEAD: &str = concat!(
    "You are an expert goal-setting coach. Break down the following goal into exactly 5 actionable, specific steps.\n",
    "Also provide a complexity score from 1-10 (1 being very simple, 10 being extremely complex)."
);

const PROMPT_TAIL: &str = r#"Return your response as a JSON object with this exact structure:
{
    "tasks": [
        "Step 1 description",
        "Step 2 description",
        "Step 3 description",
        "Step 4 description",
        "Step 5 description"
    ],
    "complexity_score": <number between 1-10>
}

Make each step:
- Specific and actionable
- Progressive (building on previous steps)
- Realistic and achievable
- Clear and concise

Respond ONLY with the JSON object, no additional text."#;

// Keep the prompt's example in sync with the validated count.
const _: () = assert!(TASK_COUNT == 5);
