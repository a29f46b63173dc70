//! Context window builder: the exact, bounded list of turns sent to the
//! model for one player message.
//!
//! Older turns are dropped, not summarised: the model only remembers the most
//! recent [`HISTORY_WINDOW`] turns of a thread.

use crate::{
  generate::Turn,
  thread::{Message, Role},
};

/// Number of prior turns kept between the system turn and the new user turn.
pub const HISTORY_WINDOW: usize = 9;

/// Assemble `system + trimmed history + current`.
///
/// `transcript` is the thread's full persisted transcript and may already
/// contain `current`; that message, and anything persisted after it, is
/// excluded from history so the user turn is never duplicated. `system`-role
/// messages in the transcript are skipped. Order is never changed.
pub fn build(
  system: &str,
  transcript: &[Message],
  current: &Message,
  window: usize,
) -> Vec<Turn> {
  let prior = transcript
    .iter()
    .position(|m| m.message_id == current.message_id)
    .map_or(transcript, |idx| &transcript[..idx]);

  let history: Vec<&Message> = prior
    .iter()
    .filter(|m| m.thread_id == current.thread_id)
    .filter(|m| m.role != Role::System)
    .collect();
  let skip = history.len().saturating_sub(window);

  let mut turns = Vec::with_capacity(window.min(history.len()) + 2);
  turns.push(Turn::system(system));
  turns.extend(history.into_iter().skip(skip).map(Turn::from));
  turns.push(Turn::from(current));
  turns
}

#[cfg(test)]
mod tests {
  use chrono::{Duration, Utc};
  use uuid::Uuid;

  use super::*;

  fn transcript(thread_id: Uuid, n: usize) -> Vec<Message> {
    let start = Utc::now();
    (0..n)
      .map(|i| Message {
        message_id: Uuid::new_v4(),
        thread_id,
        role: if i % 2 == 0 { Role::User } else { Role::Assistant },
        content: format!("turn {i}"),
        created_at: start + Duration::seconds(i as i64),
      })
      .collect()
  }

  fn user_message(thread_id: Uuid, content: &str) -> Message {
    Message {
      message_id: Uuid::new_v4(),
      thread_id,
      role: Role::User,
      content: content.into(),
      created_at: Utc::now() + Duration::hours(1),
    }
  }

  #[test]
  fn first_message_has_only_system_and_user() {
    let thread = Uuid::new_v4();
    let current = user_message(thread, "Where were you at 11:30 PM?");
    let turns = build("persona", &[current.clone()], &current, HISTORY_WINDOW);
    assert_eq!(turns, [Turn::system("persona"), Turn::user("Where were you at 11:30 PM?")]);
  }

  #[test]
  fn long_history_is_cut_to_the_window() {
    let thread = Uuid::new_v4();
    let mut messages = transcript(thread, 11);
    let current = user_message(thread, "twelfth");
    messages.push(current.clone());

    let turns = build("persona", &messages, &current, HISTORY_WINDOW);

    assert_eq!(turns.len(), 1 + HISTORY_WINDOW + 1);
    assert_eq!(turns[0].role, Role::System);
    // turns 0 and 1 are dropped; 2..=10 survive in order
    let history: Vec<&str> = turns[1..10].iter().map(|t| t.content.as_str()).collect();
    let expected: Vec<String> = (2..11).map(|i| format!("turn {i}")).collect();
    assert_eq!(history, expected);
    assert_eq!(turns[10], Turn::user("twelfth"));
  }

  #[test]
  fn short_history_is_kept_whole() {
    let thread = Uuid::new_v4();
    let mut messages = transcript(thread, 4);
    let current = user_message(thread, "again");
    messages.push(current.clone());

    let turns = build("persona", &messages, &current, HISTORY_WINDOW);
    assert_eq!(turns.len(), 6);
    assert_eq!(turns[1].content, "turn 0");
  }

  #[test]
  fn current_is_not_duplicated_when_absent_from_transcript() {
    let thread = Uuid::new_v4();
    let messages = transcript(thread, 2);
    let current = user_message(thread, "new");
    let turns = build("persona", &messages, &current, HISTORY_WINDOW);
    assert_eq!(turns.len(), 4);
    assert_eq!(turns.iter().filter(|t| t.content == "new").count(), 1);
  }

  #[test]
  fn later_messages_and_system_turns_are_excluded() {
    let thread = Uuid::new_v4();
    let mut messages = transcript(thread, 2);
    let stale = Message {
      message_id: Uuid::new_v4(),
      role: Role::System,
      content: "stale system turn".into(),
      ..messages[0].clone()
    };
    messages.insert(0, stale);
    let current = user_message(thread, "mine");
    messages.push(current.clone());
    messages.push(user_message(thread, "someone else's, persisted later"));

    let turns = build("persona", &messages, &current, HISTORY_WINDOW);
    let contents: Vec<&str> = turns.iter().map(|t| t.content.as_str()).collect();
    assert_eq!(contents, ["persona", "turn 0", "turn 1", "mine"]);
  }

  #[test]
  fn other_threads_never_leak_in() {
    let thread = Uuid::new_v4();
    let mut messages = transcript(Uuid::new_v4(), 3);
    let current = user_message(thread, "hello");
    messages.push(current.clone());
    let turns = build("persona", &messages, &current, HISTORY_WINDOW);
    assert_eq!(turns.len(), 2);
  }
}
