//! crates/lumina_core/src/reflection.rs
//!
//! The reflection service: best-effort AI enrichment of an entry.
//!
//! `analyze` is total. Whatever the remote generator does (fails, answers
//! garbage, omits a field), the caller always receives a usable
//! `{mood, reflection}` pair; the entry itself is never put at risk by this
//! path.

use std::sync::Arc;

use regex::Regex;
use serde::Deserialize;
use tracing::warn;

use crate::domain::Reflection;
use crate::ports::ReflectionModel;

/// The persona and task sent to the generator alongside the entry text.
pub const REFLECTION_SYSTEM_INSTRUCTION: &str = "You are an empathetic personal journal assistant. \
Analyze the journal entry you are given. Provide a brief, supportive reflection (2-3 sentences) \
and identify the primary mood (one word). \
Respond with a JSON object containing exactly two string fields: \
\"mood\" and \"reflection\".";

/// Default mood when the generator omits or empties the field.
const DEFAULT_MOOD: &str = "Neutral";
/// Default reflection when the generator omits or empties the field.
const DEFAULT_REFLECTION: &str = "Thank you for sharing your thoughts today.";

/// Mood reported when the generator could not be reached at all.
const UNAVAILABLE_MOOD: &str = "Unknown";
/// Reflection reported when the generator could not be reached at all.
/// Worded so the user knows the entry itself is fine.
const UNAVAILABLE_REFLECTION: &str =
    "A reflection couldn't be generated right now. Your entry is safe and unaffected.";

impl Reflection {
    /// The fallback pair for a transport or service failure.
    pub fn unavailable() -> Self {
        Self {
            mood: UNAVAILABLE_MOOD.to_string(),
            reflection: UNAVAILABLE_REFLECTION.to_string(),
        }
    }

    /// The fallback pair for generator output that couldn't be interpreted.
    pub fn neutral() -> Self {
        Self {
            mood: DEFAULT_MOOD.to_string(),
            reflection: DEFAULT_REFLECTION.to_string(),
        }
    }
}

/// What the generator is asked to return.
#[derive(Deserialize)]
struct RawReflection {
    #[serde(default)]
    mood: Option<String>,
    #[serde(default)]
    reflection: Option<String>,
}

/// Calls the remote generator and normalizes whatever comes back.
pub struct ReflectionService {
    model: Arc<dyn ReflectionModel>,
}

impl ReflectionService {
    pub fn new(model: Arc<dyn ReflectionModel>) -> Self {
        Self { model }
    }

    /// Produces a mood label and supportive reflection for `content`.
    ///
    /// Never errors. One call is one attempt against the generator; no
    /// retries, reflections are enrichment rather than a critical path.
    pub async fn analyze(&self, content: &str) -> Reflection {
        match self.model.generate_reflection(content).await {
            Ok(raw) => interpret_output(&raw),
            Err(e) => {
                warn!(error = %e, "reflection generator unreachable, using fallback");
                Reflection::unavailable()
            }
        }
    }
}

/// Turns the generator's raw text into a reflection pair.
///
/// Accepts the requested JSON object (optionally inside a markdown fence),
/// then the legacy `MOOD:` / `REFLECTION:` line format, and falls back to a
/// neutral pair when neither matches. A present-but-empty field is treated
/// as omitted and defaulted on its own.
fn interpret_output(raw: &str) -> Reflection {
    let body = strip_code_fence(raw.trim());

    if let Ok(fields) = serde_json::from_str::<RawReflection>(body) {
        return Reflection {
            mood: field_or(fields.mood, DEFAULT_MOOD),
            reflection: field_or(fields.reflection, DEFAULT_REFLECTION),
        };
    }

    if let Some(reflection) = parse_labelled_lines(body) {
        return reflection;
    }

    warn!("reflection generator returned unparsable output, using neutral fallback");
    Reflection::neutral()
}

fn field_or(value: Option<String>, default: &str) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v,
        _ => default.to_string(),
    }
}

/// The original generator contract: `MOOD: [word]` / `REFLECTION: [text]`.
fn parse_labelled_lines(text: &str) -> Option<Reflection> {
    let mood_pattern = Regex::new(r"(?i)MOOD:\s*(\w+)").ok()?;
    let reflection_pattern = Regex::new(r"(?i)REFLECTION:\s*(.+)").ok()?;

    let mood = mood_pattern
        .captures(text)
        .map(|c| c[1].trim().to_string());
    let reflection = reflection_pattern
        .captures(text)
        .map(|c| c[1].trim().to_string());

    if mood.is_none() && reflection.is_none() {
        return None;
    }
    Some(Reflection {
        mood: field_or(mood, DEFAULT_MOOD),
        reflection: field_or(reflection, DEFAULT_REFLECTION),
    })
}

/// Strips a surrounding markdown code fence, which chat models like to wrap
/// JSON in even when asked not to.
fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Skip the info string ("json") on the opening fence line.
    let rest = match rest.split_once('\n') {
        Some((_, body)) => body,
        None => rest,
    };
    rest.trim_end().trim_end_matches("```").trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedModel;

    fn service(model: ScriptedModel) -> ReflectionService {
        ReflectionService::new(Arc::new(model))
    }

    #[tokio::test]
    async fn returns_the_generators_fields_verbatim() {
        let service = service(ScriptedModel::output(
            r#"{"mood": "Anxious", "reflection": "It sounds like a heavy day; be gentle with yourself."}"#,
        ));
        let result = service.analyze("I feel overwhelmed").await;
        assert_eq!(result.mood, "Anxious");
        assert_eq!(
            result.reflection,
            "It sounds like a heavy day; be gentle with yourself."
        );
    }

    #[tokio::test]
    async fn accepts_json_wrapped_in_a_markdown_fence() {
        let service = service(ScriptedModel::output(
            "```json\n{\"mood\": \"Calm\", \"reflection\": \"A quiet day well spent.\"}\n```",
        ));
        let result = service.analyze("sat by the window").await;
        assert_eq!(result.mood, "Calm");
        assert_eq!(result.reflection, "A quiet day well spent.");
    }

    #[tokio::test]
    async fn accepts_the_labelled_line_format() {
        let service = service(ScriptedModel::output(
            "MOOD: Hopeful\nREFLECTION: Small steps still move you forward.",
        ));
        let result = service.analyze("made a little progress").await;
        assert_eq!(result.mood, "Hopeful");
        assert_eq!(result.reflection, "Small steps still move you forward.");
    }

    #[tokio::test]
    async fn a_single_missing_field_is_defaulted_on_its_own() {
        let missing_mood = service(ScriptedModel::output(
            r#"{"reflection": "You showed up, and that counts."}"#,
        ));
        let result = missing_mood.analyze("tired but here").await;
        assert_eq!(result.mood, "Neutral");
        assert_eq!(result.reflection, "You showed up, and that counts.");

        let empty_reflection =
            service(ScriptedModel::output(r#"{"mood": "Tired", "reflection": ""}"#));
        let result = empty_reflection.analyze("tired but here").await;
        assert_eq!(result.mood, "Tired");
        assert_eq!(result.reflection, "Thank you for sharing your thoughts today.");
    }

    // analyze never errors and never yields an empty field.
    #[tokio::test]
    async fn always_returns_a_full_pair() {
        let outputs = [
            ScriptedModel::output(r#"{"mood": "Glad", "reflection": "Nice."}"#),
            ScriptedModel::output("complete nonsense"),
            ScriptedModel::output(""),
            ScriptedModel::output("{}"),
            ScriptedModel::failing(),
        ];
        for model in outputs {
            let result = service(model).analyze("Today was good").await;
            assert!(!result.mood.trim().is_empty());
            assert!(!result.reflection.trim().is_empty());
        }
    }

    // The transport fallback and the parse fallback are distinguishable.
    #[tokio::test]
    async fn transport_and_parse_fallbacks_differ() {
        let from_fault = service(ScriptedModel::failing())
            .analyze("Today was good")
            .await;
        let from_garbage = service(ScriptedModel::output("not json at all"))
            .analyze("Today was good")
            .await;

        assert_eq!(from_fault, Reflection::unavailable());
        assert_eq!(from_garbage, Reflection::neutral());
        assert_ne!(from_fault.mood, from_garbage.mood);
        assert_ne!(from_fault.reflection, from_garbage.reflection);
    }
}
