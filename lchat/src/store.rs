//! Conversation record windowing, prompt assembly, and commit.

use lprovider::Turn;

use crate::Session;

/// Returns the last `max_context_length` turns of `records`, oldest first.
pub fn windowed(records: &[Turn], max_context_length: usize) -> Vec<Turn> {
    let start = records.len().saturating_sub(max_context_length);
    records[start..].to_vec()
}

/// One system turn, then `history`, then the user's `question`.
pub fn build_prompt_turns(history: Vec<Turn>, system_prompt: &str, question: &str) -> Vec<Turn> {
    let mut turns = Vec::with_capacity(history.len() + 2);
    turns.push(Turn::system(system_prompt));
    turns.extend(history);
    turns.push(Turn::user(question));
    turns
}

/// Appends the finished exchange to the session.
///
/// Called exactly once per successful answer, never on cancellation or failure.
pub fn commit(session: &mut Session, question: impl Into<String>, answer: impl Into<String>) {
    session.conversation_records.push(Turn::user(question));
    session.conversation_records.push(Turn::assistant(answer));
}

impl Session {
    pub fn windowed(&self, max_context_length: usize) -> Vec<Turn> {
        windowed(&self.conversation_records, max_context_length)
    }
}
