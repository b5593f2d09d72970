//! Phrase resolver.
//!
//! Turns one utterance into a playback target using three ordered rules:
//! 1. Continuation: the bare continuation marker resumes playback
//! 2. Specific query: the first entity pattern that matches decides the type
//! 3. Generic query: every section in precedence order, first match above
//!    `GENERIC_THRESHOLD` wins

mod recognizer;
mod types;

pub use recognizer::{RegexRecognizer, Recognizer};
pub use types::*;

use std::sync::Arc;

use tracing::debug;

use crate::index::{EntityType, SourceIndex};
use crate::matcher::best_match;
use crate::metrics::{MATCH_CONFIDENCE, QUERIES_RESOLVED, QUERIES_UNMATCHED};

/// Added once when the phrase names the skill explicitly.
pub const UTTERANCE_BONUS: f64 = 0.1;

/// Generic matches must score strictly above this.
pub const GENERIC_THRESHOLD: f64 = 0.7;

/// Pattern order for specific queries, with each type's bonus. Titles get
/// none.
const SPECIFIC_ORDER: [(EntityType, f64); 7] = [
    (EntityType::Album, 0.1),
    (EntityType::Artist, 0.1),
    (EntityType::Title, 0.0),
    (EntityType::Genre, 0.1),
    (EntityType::Playlist, 0.1),
    (EntityType::Favorite, 0.1),
    (EntityType::Podcast, 0.1),
];

/// Curated sources outrank raw catalog lookups.
const GENERIC_ORDER: [EntityType; 7] = [
    EntityType::Playlist,
    EntityType::Favorite,
    EntityType::Podcast,
    EntityType::Genre,
    EntityType::Artist,
    EntityType::Album,
    EntityType::Title,
];

/// An utterance with its skill and backend segments removed.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedPhrase {
    pub text: String,
    pub backend: Option<String>,
    pub bonus: f64,
}

enum Specific {
    /// No entity pattern matched.
    NoPattern,
    /// A pattern matched but nothing could be looked up.
    Rejected,
    Resolved(ResolvedQuery),
}

pub struct PhraseResolver {
    recognizer: Arc<dyn Recognizer>,
}

impl PhraseResolver {
    pub fn new(recognizer: Arc<dyn Recognizer>) -> Self {
        Self { recognizer }
    }

    pub fn parse(&self, phrase: &str) -> ParsedPhrase {
        let bonus = if self.recognizer.has_bonus_marker(phrase) {
            UTTERANCE_BONUS
        } else {
            0.0
        };

        let text = self.recognizer.strip_on_squeezebox(phrase);
        let backend = self.recognizer.extract_backend_hint(&text);
        let text = self.recognizer.strip_backend(&text);

        debug!(
            "Parsed phrase '{}' -> text='{}', backend={:?}, bonus={}",
            phrase, text, backend, bonus
        );
        ParsedPhrase {
            text,
            backend,
            bonus,
        }
    }

    /// Resolve `phrase` against `index`. The returned query has no player.
    pub fn resolve(&self, phrase: &str, index: &SourceIndex) -> Option<ResolvedQuery> {
        let parsed = self.parse(phrase);

        let resolved = if self.recognizer.is_continuation(&parsed.text) {
            Some(self.resolved(
                &parsed,
                None,
                PlaybackTarget::Continue,
                1.0,
                ResolutionPath::Continuation,
            ))
        } else {
            match self.specific_query(&parsed, index) {
                Specific::Resolved(query) => Some(query),
                Specific::Rejected => None,
                Specific::NoPattern => self.generic_query(&parsed, index),
            }
        };

        match &resolved {
            Some(query) => {
                QUERIES_RESOLVED
                    .with_label_values(&[query.target.kind(), query.path.as_str()])
                    .inc();
                MATCH_CONFIDENCE
                    .with_label_values(&[])
                    .observe(query.confidence);
                debug!(
                    "Resolved '{}' -> {} '{}' ({:.3}, {:?})",
                    phrase,
                    query.target.kind(),
                    query.matched_name.as_deref().unwrap_or(""),
                    query.confidence,
                    query.tier
                );
            }
            None => {
                QUERIES_UNMATCHED.inc();
                debug!("No match for '{}'", phrase);
            }
        }
        resolved
    }

    fn specific_query(&self, parsed: &ParsedPhrase, index: &SourceIndex) -> Specific {
        for (entity_type, type_bonus) in SPECIFIC_ORDER {
            let Some(name) = self.recognizer.capture(entity_type, &parsed.text) else {
                continue;
            };
            debug!("{} pattern captured '{}'", entity_type, name);
            let name = name.trim();

            if name.is_empty() || index.is_empty(entity_type) {
                debug!("Nothing to match {} '{}' against", entity_type, name);
                return Specific::Rejected;
            }

            let Some(found) = best_match(name, index.names(entity_type)) else {
                return Specific::Rejected;
            };
            let Some(record) = index.get(entity_type, found.candidate) else {
                return Specific::Rejected;
            };

            let confidence = (found.confidence + parsed.bonus + type_bonus).min(1.0);
            return Specific::Resolved(self.resolved(
                parsed,
                Some(found.candidate),
                PlaybackTarget::from_record(found.candidate, record),
                confidence,
                ResolutionPath::Specific,
            ));
        }
        Specific::NoPattern
    }

    fn generic_query(&self, parsed: &ParsedPhrase, index: &SourceIndex) -> Option<ResolvedQuery> {
        for entity_type in GENERIC_ORDER {
            if index.is_empty(entity_type) {
                continue;
            }
            let Some(found) = best_match(&parsed.text, index.names(entity_type)) else {
                continue;
            };
            if found.confidence <= GENERIC_THRESHOLD {
                continue;
            }
            let record = index.get(entity_type, found.candidate)?;
            return Some(self.resolved(
                parsed,
                Some(found.candidate),
                PlaybackTarget::from_record(found.candidate, record),
                found.confidence,
                ResolutionPath::Generic,
            ));
        }
        None
    }

    fn resolved(
        &self,
        parsed: &ParsedPhrase,
        matched_name: Option<&str>,
        target: PlaybackTarget,
        confidence: f64,
        path: ResolutionPath,
    ) -> ResolvedQuery {
        ResolvedQuery {
            phrase: parsed.text.clone(),
            matched_name: matched_name.map(str::to_string),
            target,
            confidence,
            tier: ConfidenceTier::from_confidence(confidence),
            path,
            backend: parsed.backend.clone(),
            player: None,
        }
    }
}
