//! Generate service — prompt → generator output → normalized elements.
//!
//! DESIGN
//! ======
//! The text-to-structure step is an injected `DiagramGenerator`. It is
//! called once per request under a timeout; its raw text must be a JSON
//! array of element specs, which are validated against the closed kind set
//! and rebuilt through the element builder so every returned element has
//! the full schema regardless of what the generator echoed.
//!
//! Failures fall into two buckets: unparseable output (`Invalid JSON from
//! LLM:`) and everything else (`Error generating diagram:`). Either way the
//! caller gets an empty diagram, never a partial one.

use std::fmt::Write;
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::diagram::DiagramResponse;
use crate::element::{DiagramElement, ElementBatch, ElementKind, ElementSpec};
use crate::llm::LlmChat;
use crate::llm::config::parse_u64;
use crate::llm::types::{LlmError, Message};

pub const DEFAULT_GENERATE_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_GENERATE_MAX_TOKENS: u32 = 4096;

// =============================================================================
// SETTINGS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerateSettings {
    /// Upper bound on a single generator call.
    pub timeout: Duration,
    pub max_tokens: u32,
}

impl Default for GenerateSettings {
    fn default() -> Self {
        Self { timeout: Duration::from_secs(DEFAULT_GENERATE_TIMEOUT_SECS), max_tokens: DEFAULT_GENERATE_MAX_TOKENS }
    }
}

impl GenerateSettings {
    /// Read `GENERATE_TIMEOUT_SECS` and `GENERATE_MAX_TOKENS`, falling back to
    /// defaults for absent or unparseable values.
    #[must_use]
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let timeout_secs = parse_u64(var("GENERATE_TIMEOUT_SECS"), DEFAULT_GENERATE_TIMEOUT_SECS);
        let max_tokens = var("GENERATE_MAX_TOKENS")
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(DEFAULT_GENERATE_MAX_TOKENS);
        Self { timeout: Duration::from_secs(timeout_secs), max_tokens }
    }
}

// =============================================================================
// ERROR
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    /// Generator output is not a JSON array of valid element specs.
    #[error("{0}")]
    Parse(String),
    #[error("generator timed out after {}s", .0.as_secs())]
    Timeout(Duration),
    #[error(transparent)]
    Llm(#[from] LlmError),
}

impl GenerateError {
    #[must_use]
    pub fn is_parse(&self) -> bool {
        matches!(self, Self::Parse(_))
    }

    /// Message returned to the client in the failure envelope.
    #[must_use]
    pub fn public_message(&self) -> String {
        if self.is_parse() {
            format!("Invalid JSON from LLM: {self}")
        } else {
            format!("Error generating diagram: {self}")
        }
    }
}

// =============================================================================
// GENERATOR SEAM
// =============================================================================

/// Text-to-structure collaborator: instructions + prompt → raw JSON text.
#[async_trait::async_trait]
pub trait DiagramGenerator: Send + Sync {
    /// Produce raw text that should contain a JSON array of element specs.
    ///
    /// # Errors
    ///
    /// Returns an [`LlmError`] if the underlying service fails.
    async fn generate(&self, system: &str, prompt: &str) -> Result<String, LlmError>;
}

/// Generator backed by an LLM chat provider.
pub struct LlmGenerator {
    llm: Arc<dyn LlmChat>,
    max_tokens: u32,
}

impl LlmGenerator {
    #[must_use]
    pub fn new(llm: Arc<dyn LlmChat>, max_tokens: u32) -> Self {
        Self { llm, max_tokens }
    }
}

#[async_trait::async_trait]
impl DiagramGenerator for LlmGenerator {
    async fn generate(&self, system: &str, prompt: &str) -> Result<String, LlmError> {
        let messages = [Message::user(prompt)];
        let response = self.llm.chat(self.max_tokens, system, &messages).await?;
        info!(
            model = %response.model,
            stop_reason = %response.stop_reason,
            input_tokens = response.input_tokens,
            output_tokens = response.output_tokens,
            "generate: LLM response"
        );
        Ok(response.text())
    }
}

/// Static two-element diagram used when no LLM is configured.
pub struct PlaceholderGenerator;

#[async_trait::async_trait]
impl DiagramGenerator for PlaceholderGenerator {
    async fn generate(&self, _system: &str, prompt: &str) -> Result<String, LlmError> {
        let specs = [
            ElementSpec::new(ElementKind::Rectangle, 100.0, 100.0).with_size(200.0, 100.0),
            ElementSpec::new(ElementKind::Text, 150.0, 130.0)
                .with_size(100.0, 40.0)
                .with_text(format!("Generated from: {prompt}")),
        ];
        serde_json::to_string(&specs).map_err(|e| LlmError::ApiParse(e.to_string()))
    }
}

// =============================================================================
// MAIN ENTRY POINT
// =============================================================================

/// Generate a diagram for `prompt`. Single attempt, no partial results.
///
/// # Errors
///
/// `Parse` when the generator output is not a valid element array,
/// `Timeout` when the generator exceeds `settings.timeout`, `Llm` when the
/// generator itself fails.
pub async fn generate_diagram(
    generator: &dyn DiagramGenerator,
    settings: &GenerateSettings,
    prompt: &str,
    diagram_type: Option<&str>,
) -> Result<Vec<DiagramElement>, GenerateError> {
    info!(prompt_len = prompt.len(), diagram_type = diagram_type.unwrap_or("-"), "generate: prompt received");

    let system = build_system_prompt(diagram_type);
    let raw = tokio::time::timeout(settings.timeout, generator.generate(&system, prompt))
        .await
        .map_err(|_| GenerateError::Timeout(settings.timeout))??;

    let specs = parse_element_specs(&raw)?;
    let mut batch = ElementBatch::with_capacity(specs.len());
    for spec in &specs {
        batch.push(spec);
    }

    info!(elements = batch.len(), "generate: diagram complete");
    Ok(batch.into_elements())
}

/// Collapse a generation result into the response envelope.
#[must_use]
pub fn into_response(result: Result<Vec<DiagramElement>, GenerateError>) -> DiagramResponse {
    match result {
        Ok(elements) => DiagramResponse::success(elements),
        Err(e) => {
            warn!(error = %e, parse = e.is_parse(), "generate: failed");
            DiagramResponse::failure(e.public_message())
        }
    }
}

// =============================================================================
// PARSING
// =============================================================================

/// Parse generator output into element specs.
///
/// Accepts the array bare or inside the first Markdown code fence, with any
/// prose around the fence discarded. An empty
/// array is rejected: a diagram with no elements is not a result.
pub(crate) fn parse_element_specs(raw: &str) -> Result<Vec<ElementSpec>, GenerateError> {
    let body = strip_code_fence(raw);
    let specs: Vec<ElementSpec> = serde_json::from_str(body).map_err(|e| GenerateError::Parse(e.to_string()))?;
    if specs.is_empty() {
        return Err(GenerateError::Parse("no elements in response".into()));
    }
    Ok(specs)
}

fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(open) = trimmed.find("```") else {
        return trimmed;
    };
    let rest = &trimmed[open + 3..];
    // Drop the info string (e.g. `json`) on the opening fence line.
    let rest = rest.split_once('\n').map_or(rest, |(_, body)| body);
    rest.find("```").map_or(rest, |close| &rest[..close]).trim()
}

// =============================================================================
// SYSTEM PROMPT
// =============================================================================

pub(crate) fn build_system_prompt(diagram_type: Option<&str>) -> String {
    let mut prompt = String::from(
        "You turn a description into an Excalidraw diagram. Pick the kind of diagram \
         that fits the description best (flowchart, architecture, mind map, process, \
         entity relationship).\n\n\
         Respond with ONLY a JSON array, no prose. Each entry is one element:\n\
         - type: one of \"rectangle\", \"ellipse\", \"diamond\", \"text\", \"arrow\", \"line\"\n\
         - x, y: top-left position in canvas pixels (numbers)\n\
         - width, height: size for rectangle, ellipse, diamond and text (numbers > 0)\n\
         - text: label content, for text elements only\n\n\
         Styling, ids and versioning are filled in for you; omit them.\n\
         Space elements so they do not overlap, and label shapes by placing a text \
         element inside them.\n",
    );

    if let Some(kind) = diagram_type.map(str::trim).filter(|k| !k.is_empty()) {
        let _ = write!(prompt, "\nThe user prefers a {} diagram.\n", diagram_type_label(kind));
    }
    prompt
}

/// Expand the short diagram type ids the client sends.
fn diagram_type_label(kind: &str) -> &str {
    match kind {
        "architecture" => "system architecture",
        "mindmap" => "mind map",
        "process" => "process flow",
        "entity" => "entity relationship",
        other => other,
    }
}

#[cfg(test)]
#[path = "generate_test.rs"]
mod tests;
