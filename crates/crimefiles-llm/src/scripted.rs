//! [`ScriptedResponder`] answers as a guarded suspect without calling out
//! to any model.
//!
//! Replies depend only on the latest player turn, so a conversation replayed
//! against the responder always produces the same transcript.

use crimefiles_core::{
  generate::{Generator, Turn},
  persona::MAX_REPLY_WORDS,
  thread::Role,
};

use crate::Result;

const ACCUSATION_WORDS: &[&str] = &[
  "kill", "killed", "murder", "murdered", "murderer", "confess", "guilty", "admit",
];
const CONFRONTATION_WORDS: &[&str] = &[
  "lie", "lying", "liar", "lied", "proof", "evidence", "explain", "receipt", "why",
];

/// Question length, in words, at or under which the suspect answers tersely.
const SHORT_QUESTION_WORDS: usize = 5;

pub const REFUSAL: &str = "I didn't do this, and no amount of pressure will make me say I did. \
   I've told you what I know.";
pub const DEFLECTION: &str = "That doesn't prove anything about me. You should be asking who \
   else had a reason to be near him that night.";
pub const TERSE: &str = "I'd rather not guess. Ask me something specific.";
pub const SILENCE: &str = "I have nothing to say until you ask me something.";

/// Keyword-driven offline stand-in for a language model.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScriptedResponder;

impl ScriptedResponder {
  /// Reply to the last player turn in `turns`.
  pub fn respond(&self, turns: &[Turn]) -> String {
    let Some(question) = turns
      .iter()
      .rev()
      .find(|t| t.role == Role::User)
      .map(|t| t.content.trim())
      .filter(|q| !q.is_empty())
    else {
      return SILENCE.to_owned();
    };

    let lowered = question.to_lowercase();
    let words: Vec<&str> = lowered
      .split(|c: char| !(c.is_alphanumeric() || c == '\''))
      .filter(|w| !w.is_empty())
      .collect();
    let mentions = |vocab: &[&str]| words.iter().any(|w| vocab.contains(w));

    let reply = if mentions(ACCUSATION_WORDS) {
      REFUSAL.to_owned()
    } else if mentions(CONFRONTATION_WORDS) {
      DEFLECTION.to_owned()
    } else if words.len() <= SHORT_QUESTION_WORDS {
      TERSE.to_owned()
    } else {
      format!(
        "\"{question}\" I've already told you what I remember, detective. \
         I don't see what more I can add."
      )
    };
    trim_words(&reply, MAX_REPLY_WORDS)
  }
}

impl Generator for ScriptedResponder {
  type Error = crate::Error;

  async fn generate(&self, turns: &[Turn], _temperature: f32) -> Result<String> {
    Ok(self.respond(turns))
  }
}

/// Keep at most `max` whitespace-separated words.
fn trim_words(text: &str, max: usize) -> String {
  let words: Vec<&str> = text.split_whitespace().collect();
  if words.len() <= max {
    words.join(" ")
  } else {
    format!("{}…", words[..max].join(" "))
  }
}
