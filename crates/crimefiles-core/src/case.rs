//! Case and suspect types: the read-mostly material a round is played on.
//!
//! Cases and suspects are authored by an administrator and never change
//! during a round. The interrogation engine only reads them.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ─── Evidence vocabulary ─────────────────────────────────────────────────────

/// Closed vocabulary shared by timeline events and derived leads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EvidenceTag {
  Means,
  Motive,
  Opportunity,
  Alibi,
  Witness,
  Action,
  Clue,
  Solution,
}

// ─── Timeline ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineTick {
  pub id:    String,
  /// Human-readable time label, e.g. "10:30 PM".
  pub label: String,
}

/// Whose activity a timeline lane tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LaneKind {
  Victim,
  Suspect,
  Witness,
  Solution,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineLane {
  pub id:    String,
  pub title: String,
  pub kind:  LaneKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEvent {
  pub id:         String,
  pub lane_id:    String,
  /// Index into [`Timeline::ticks`].
  pub start_tick: usize,
  /// Inclusive end index; a missing value spans a single tick.
  pub end_tick:   Option<usize>,
  pub title:      String,
  #[serde(default)]
  pub tags:       Vec<EvidenceTag>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeline {
  pub ticks:  Vec<TimelineTick>,
  pub lanes:  Vec<TimelineLane>,
  pub events: Vec<TimelineEvent>,
}

impl Timeline {
  /// Events a suspect may plausibly know about, in tick order.
  ///
  /// Events on solution lanes, and events tagged [`EvidenceTag::Solution`],
  /// are withheld.
  pub fn public_events(&self) -> Vec<(&str, &TimelineEvent)> {
    let mut events: Vec<(&str, &TimelineEvent)> = self
      .events
      .iter()
      .filter(|e| !e.tags.contains(&EvidenceTag::Solution))
      .filter(|e| {
        self
          .lanes
          .iter()
          .find(|l| l.id == e.lane_id)
          .is_none_or(|l| l.kind != LaneKind::Solution)
      })
      .map(|e| {
        let label = self
          .ticks
          .get(e.start_tick)
          .map(|t| t.label.as_str())
          .unwrap_or("");
        (label, e)
      })
      .collect();
    events.sort_by_key(|(_, e)| e.start_tick);
    events
  }
}

// ─── Case narrative ──────────────────────────────────────────────────────────

/// The story a round is played on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseNarrative {
  pub case_id:             String,
  pub title:               String,
  /// Short teaser shown on the case list.
  pub excerpt:             String,
  pub story:               String,
  #[serde(default)]
  pub hints:               Vec<String>,
  #[serde(default)]
  pub timeline:            Option<Timeline>,
  /// The suspect who actually did it. At most one per case.
  #[serde(default)]
  pub solution_suspect_id: Option<String>,
}

// ─── Suspect profile ─────────────────────────────────────────────────────────

/// A suspect within a case. Immutable during a round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuspectProfile {
  pub suspect_id:  String,
  pub case_id:     String,
  pub name:        String,
  pub age:         u32,
  pub occupation:  String,
  pub gender:      String,
  #[serde(default)]
  pub description: Option<String>,
  #[serde(default)]
  pub traits:      Vec<String>,
  #[serde(default)]
  pub mannerisms:  Vec<String>,
  #[serde(default)]
  pub whereabouts: Vec<String>,
  /// Free-text persona brief written by the case author.
  #[serde(default)]
  pub brief:       Option<String>,
  #[serde(default)]
  pub is_culprit:  bool,
}

// ─── Case file ───────────────────────────────────────────────────────────────

/// A case together with its suspects; the unit of import.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseFile {
  #[serde(flatten)]
  pub case:     CaseNarrative,
  pub suspects: Vec<SuspectProfile>,
}

impl CaseFile {
  /// Resolve the single solution suspect, if any.
  ///
  /// The solution may be named on the case, flagged on one suspect, or both
  /// (in which case they must agree).
  pub fn solution_suspect_id(&self) -> Result<Option<String>> {
    let flagged: Vec<String> = self
      .suspects
      .iter()
      .filter(|s| s.is_culprit)
      .map(|s| s.suspect_id.clone())
      .collect();

    let from_case = self.case.solution_suspect_id.clone();

    let mut candidates = flagged.clone();
    if let Some(id) = &from_case
      && !candidates.contains(id)
    {
      candidates.push(id.clone());
    }

    if candidates.len() > 1 {
      return Err(Error::MultipleCulprits {
        case_id:  self.case.case_id.clone(),
        suspects: candidates,
      });
    }

    if let Some(id) = &from_case
      && !self.suspects.iter().any(|s| &s.suspect_id == id)
    {
      return Err(Error::UnknownSolution {
        case_id:    self.case.case_id.clone(),
        suspect_id: id.clone(),
      });
    }

    Ok(candidates.pop())
  }
}


#[cfg(test)]
mod tests {
  use super::{fixtures::*, *};

  fn file(suspects: Vec<SuspectProfile>) -> CaseFile {
    CaseFile { case: case(), suspects }
  }

  #[test]
  fn no_solution_is_allowed() {
    assert_eq!(file(vec![suspect()]).solution_suspect_id().unwrap(), None);
  }

  #[test]
  fn culprit_flag_names_the_solution() {
    let mut maya = suspect();
    maya.is_culprit = true;
    let id = file(vec![maya.clone()]).solution_suspect_id().unwrap();
    assert_eq!(id, Some(maya.suspect_id));
  }

  #[test]
  fn two_culprits_are_rejected() {
    let mut a = suspect();
    a.is_culprit = true;
    let mut b = suspect();
    b.suspect_id = "other".into();
    b.is_culprit = true;
    assert!(matches!(
      file(vec![a, b]).solution_suspect_id(),
      Err(Error::MultipleCulprits { .. })
    ));
  }

  #[test]
  fn solution_must_name_a_known_suspect() {
    let mut f = file(vec![suspect()]);
    f.case.solution_suspect_id = Some("nobody".into());
    assert!(matches!(
      f.solution_suspect_id(),
      Err(Error::UnknownSolution { .. })
    ));
  }

  #[test]
  fn public_events_hide_the_solution_lane() {
    let timeline = Timeline {
      ticks:  vec![
        TimelineTick { id: "t0".into(), label: "9:00 PM".into() },
        TimelineTick { id: "t1".into(), label: "11:30 PM".into() },
      ],
      lanes:  vec![
        TimelineLane { id: "victim".into(), title: "Arnav".into(), kind: LaneKind::Victim },
        TimelineLane { id: "truth".into(), title: "What happened".into(), kind: LaneKind::Solution },
      ],
      events: vec![
        TimelineEvent {
          id:         "e2".into(),
          lane_id:    "victim".into(),
          start_tick: 1,
          end_tick:   None,
          title:      "Body discovered".into(),
          tags:       vec![EvidenceTag::Clue],
        },
        TimelineEvent {
          id:         "e1".into(),
          lane_id:    "victim".into(),
          start_tick: 0,
          end_tick:   None,
          title:      "Arnav returns to the study".into(),
          tags:       vec![],
        },
        TimelineEvent {
          id:         "e3".into(),
          lane_id:    "truth".into(),
          start_tick: 1,
          end_tick:   None,
          title:      "Maya strikes".into(),
          tags:       vec![],
        },
      ],
    };

    let events = timeline.public_events();
    let titles: Vec<&str> = events.iter().map(|(_, e)| e.title.as_str()).collect();
    assert_eq!(titles, ["Arnav returns to the study", "Body discovered"]);
    assert_eq!(events[1].0, "11:30 PM");
  }
}
