//! Prompts sent to the chat-completion provider
//!
//! The relay pairs one fixed system prompt per endpoint with a single user
//! turn. The client side builds the document and summary instructions.

/// System prompt for `/ask`
pub const ASK_SYSTEM_PROMPT: &str =
    "You are A buddy who only answers study related questions in a very friendly and helpful manner.";

/// System prompt for `/diagramise`
pub const DIAGRAM_SYSTEM_PROMPT: &str = "You turn study material into a compact ASCII diagram \
(boxes, arrows, trees or tables drawn with plain characters) that captures the key ideas and \
how they relate. Reply with the diagram only, no code fences and no extra commentary.";

/// System prompt for `/plan`
pub const PLAN_SYSTEM_PROMPT: &str = "You are a friendly study planner. Given the current time \
and a todo list with due times and completion status, write a realistic plan for the rest of \
the day in markdown. Order pending tasks by due time, flag anything overdue, suggest short \
breaks, and keep completed tasks out of the schedule except for a brief note of progress.";

/// Prefix of the summarization request sent for an uploaded document
pub const SUMMARY_INSTRUCTION: &str = "Please provide a comprehensive summary of the following text. Extract key points, main ideas, and important information:";

/// User turn sent to `/plan`'s provider call
///
/// # Examples
///
/// ```
/// use studyqa::prompts::plan_user_prompt;
///
/// let prompt = plan_user_prompt("9:00:00 AM", "[]");
/// assert!(prompt.starts_with("Current time: 9:00:00 AM"));
/// assert!(prompt.ends_with("[]"));
/// ```
pub fn plan_user_prompt(current_time: &str, todos_json: &str) -> String {
    format!("Current time: {}\n\nTodo list:\n{}", current_time, todos_json)
}

/// Summarization request for extracted document text
pub fn summary_request(text: &str) -> String {
    format!("{}\n\n{}", SUMMARY_INSTRUCTION, text)
}

/// Replacement for the latest user turn when a document is attached
///
/// # Examples
///
/// ```
/// use studyqa::prompts::document_turn;
///
/// let turn = document_turn("Summarize chapter 2", "notes.pdf", "Cells divide.");
/// assert_eq!(
///     turn,
///     "Instructions:\nSummarize chapter 2\n\nPDF File: notes.pdf\n\nPDF Content:\nCells divide."
/// );
/// ```
pub fn document_turn(question: &str, document_name: &str, document_text: &str) -> String {
    format!(
        "Instructions:\n{}\n\nPDF File: {}\n\nPDF Content:\n{}",
        question, document_name, document_text
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ask_prompt_is_study_focused() {
        assert!(ASK_SYSTEM_PROMPT.contains("study related questions"));
    }

    #[test]
    fn test_diagram_prompt_asks_for_ascii() {
        assert!(DIAGRAM_SYSTEM_PROMPT.contains("ASCII"));
    }

    #[test]
    fn test_summary_request_layout() {
        let request = summary_request("Photosynthesis converts light.");
        assert!(request.starts_with("Please provide a comprehensive summary"));
        assert!(request.ends_with(":\n\nPhotosynthesis converts light."));
    }

    #[test]
    fn test_plan_user_prompt_contains_todos() {
        let prompt = plan_user_prompt("now", r#"[{"text":"Read"}]"#);
        assert!(prompt.contains("Todo list:\n[{\"text\":\"Read\"}]"));
    }
}
