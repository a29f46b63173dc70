//! Claim and lead extraction: advisory signals layered on top of a
//! transcript.
//!
//! Signals are never persisted. They are recomputed from the live transcript
//! whenever they are needed, and a failed extraction must never fail the turn
//! it was computed for.

use serde::{Deserialize, Serialize};

use crate::{
  Result,
  case::{CaseNarrative, EvidenceTag, SuspectProfile},
  thread::{Message, Role},
};

// ─── Types ───────────────────────────────────────────────────────────────────

/// Which domain categories the conversation has touched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimFlags {
  pub mentions_time:     bool,
  pub mentions_location: bool,
  pub mentions_weapon:   bool,
  pub mentions_alibi:    bool,
}

/// A player-facing pointer at something worth following up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lead {
  pub title:         String,
  pub tags:          Vec<EvidenceTag>,
  /// One sentence explaining why this lead was raised.
  pub justification: String,
}

/// Everything derived from one pass over a transcript.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Signals {
  pub claims:      ClaimFlags,
  pub leads:       Vec<Lead>,
  /// How well the suspect's account holds together, in `[0, 1]`.
  pub consistency: Option<f64>,
}

impl Signals {
  /// Build signals, clamping `consistency` into `[0, 1]`. Non-finite scores
  /// are dropped.
  pub fn new(claims: ClaimFlags, leads: Vec<Lead>, consistency: Option<f64>) -> Self {
    let consistency = consistency
      .filter(|c| c.is_finite())
      .map(|c| c.clamp(0.0, 1.0));
    Self { claims, leads, consistency }
  }
}

// ─── Extractor seam ──────────────────────────────────────────────────────────

/// Derives [`Signals`] from a transcript.
///
/// The keyword implementation below is the default; a structured-output model
/// call can be dropped in behind the same interface.
pub trait SignalExtractor: Send + Sync {
  fn extract(
    &self,
    case: &CaseNarrative,
    suspect: &SuspectProfile,
    transcript: &[Message],
  ) -> Result<Signals>;
}

// ─── Keyword extractor ───────────────────────────────────────────────────────

const TIME_WORDS: &[&str] = &[
  "am", "pm", "a.m", "p.m", "hour", "hours", "time", "midnight", "noon", "o'clock", "clock",
];
const LOCATION_WORDS: &[&str] = &[
  "room", "hall", "kitchen", "restaurant", "corridor", "study", "office", "lobby", "garden",
  "balcony", "stairs", "library",
];
const WEAPON_WORDS: &[&str] = &[
  "knife", "opener", "gun", "weapon", "poison", "blade", "pistol", "rope",
];
const ALIBI_WORDS: &[&str] = &["alibi", "home", "dinner", "meeting", "witness", "witnesses"];

/// Rule-based extractor over the player's own questions.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordExtractor;

impl KeywordExtractor {
  /// Flag the categories mentioned anywhere in `texts`.
  pub fn claims<'a>(&self, texts: impl IntoIterator<Item = &'a str>) -> ClaimFlags {
    let mut flags = ClaimFlags::default();
    for text in texts {
      let lowered = text.to_lowercase();
      for word in words(&lowered) {
        flags.mentions_time |= TIME_WORDS.contains(&word) || is_clock_time(word);
        flags.mentions_location |= LOCATION_WORDS.contains(&word);
        flags.mentions_weapon |= WEAPON_WORDS.contains(&word);
        flags.mentions_alibi |= ALIBI_WORDS.contains(&word);
      }
    }
    flags
  }

  /// Turn claim flags into leads and a consistency score.
  pub fn reason(&self, claims: ClaimFlags) -> Signals {
    let mut leads = Vec::new();
    let mut score = 0.6;

    if claims.mentions_time && claims.mentions_location {
      leads.push(Lead {
        title:         "Check corridor camera near time of death".into(),
        tags:          vec![EvidenceTag::Witness, EvidenceTag::Opportunity],
        justification: "A time and a place came up together; cross-check them against the evidence."
          .into(),
      });
      score += 0.1;
    }
    if claims.mentions_weapon {
      leads.push(Lead {
        title:         "Verify weapon provenance".into(),
        tags:          vec![EvidenceTag::Means],
        justification: "Where the weapon came from could strengthen or dismiss suspicion.".into(),
      });
      score += 0.1;
    }
    if claims.mentions_alibi {
      leads.push(Lead {
        title:         "Validate suspect alibi with independent witness".into(),
        tags:          vec![EvidenceTag::Witness],
        justification: "An alibi only holds with third-party corroboration.".into(),
      });
      score += 0.05;
    }

    Signals::new(claims, leads, Some(score))
  }
}

impl SignalExtractor for KeywordExtractor {
  fn extract(
    &self,
    _case: &CaseNarrative,
    _suspect: &SuspectProfile,
    transcript: &[Message],
  ) -> Result<Signals> {
    let claims = self.claims(
      transcript
        .iter()
        .filter(|m| m.role == Role::User)
        .map(|m| m.content.as_str()),
    );
    Ok(self.reason(claims))
  }
}

/// Split on anything that cannot be part of a word, a clock time, or an
/// abbreviation like `p.m`.
fn words(text: &str) -> impl Iterator<Item = &str> {
  text
    .split(|c: char| !(c.is_alphanumeric() || matches!(c, ':' | '\'' | '.')))
    .map(|w| w.trim_matches(|c: char| matches!(c, '.' | ':' | '\'')))
    .filter(|w| !w.is_empty())
}

/// `11:30`, `9:05pm` and similar.
fn is_clock_time(word: &str) -> bool {
  let Some((hours, rest)) = word.split_once(':') else {
    return false;
  };
  let minutes: String = rest.chars().take_while(char::is_ascii_digit).collect();
  !hours.is_empty()
    && hours.len() <= 2
    && hours.chars().all(|c| c.is_ascii_digit())
    && minutes.len() == 2
}
