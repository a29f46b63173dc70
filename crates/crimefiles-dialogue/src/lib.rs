//! The interrogation turn orchestrator.
//!
//! [`Interrogator`] ties the thread store, the case repository, the persona
//! compiler, the context window builder, a language-model [`Generator`] and a
//! [`SignalExtractor`] into the single request/response operation a player
//! sees: ask a suspect a question, get an answer.
//!
//! [`Generator`]: crimefiles_core::generate::Generator
//! [`SignalExtractor`]: crimefiles_core::signals::SignalExtractor

pub mod error;
pub mod interrogator;

pub use error::{DialogueError, Result};
pub use interrogator::{DialogueSettings, InterrogationReply, Interrogator, ThreadView};
