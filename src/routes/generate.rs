//! Diagram generation route.

use axum::extract::State;
use axum::response::Json;
use serde::Deserialize;

use crate::diagram::DiagramResponse;
use crate::services::generate;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct GenerateBody {
    pub prompt: String,
    /// Optional hint from the client's diagram type picker.
    #[serde(default)]
    pub diagram_type: Option<String>,
}

/// `POST /api/generate-excalidraw` — generate diagram elements from a prompt.
///
/// Generation failures are reported in-band (`success: false`) with a 200.
pub async fn generate_excalidraw(State(state): State<AppState>, Json(body): Json<GenerateBody>) -> Json<DiagramResponse> {
    let result = generate::generate_diagram(
        state.generator.as_ref(),
        &state.settings,
        &body.prompt,
        body.diagram_type.as_deref(),
    )
    .await;
    Json(generate::into_response(result))
}

#[cfg(test)]
#[path = "generate_test.rs"]
mod tests;
