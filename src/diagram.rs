//! Diagram envelope — the JSON payload returned to the whiteboard client.

use serde::{Deserialize, Serialize};

use crate::element::DiagramElement;

pub const VIEW_BACKGROUND_COLOR: &str = "#ffffff";
pub const GRID_SIZE: u32 = 20;

/// Fixed view configuration sent alongside generated elements (`appState`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewState {
    pub view_background_color: String,
    pub grid_size: u32,
}

impl Default for ViewState {
    fn default() -> Self {
        Self { view_background_color: VIEW_BACKGROUND_COLOR.to_string(), grid_size: GRID_SIZE }
    }
}

/// Response body for a generation request.
///
/// Success carries elements and `appState`. Failure carries `error` and an
/// empty element list; there is no partial result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub elements: Vec<DiagramElement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_state: Option<ViewState>,
}

impl DiagramResponse {
    #[must_use]
    pub fn success(elements: Vec<DiagramElement>) -> Self {
        Self { success: true, error: None, elements, app_state: Some(ViewState::default()) }
    }

    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self { success: false, error: Some(message.into()), elements: Vec::new(), app_state: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{ElementKind, ElementSpec, build_element};

    #[test]
    fn success_serializes_app_state() {
        let element = build_element(&ElementSpec::new(ElementKind::Rectangle, 0.0, 0.0));
        let json = serde_json::to_value(DiagramResponse::success(vec![element])).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["elements"].as_array().map(Vec::len), Some(1));
        assert_eq!(json["appState"]["viewBackgroundColor"], "#ffffff");
        assert_eq!(json["appState"]["gridSize"], 20);
        assert!(json.get("error").is_none());
    }

    #[test]
    fn failure_has_error_and_no_elements() {
        let json = serde_json::to_value(DiagramResponse::failure("boom")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "success": false, "error": "boom", "elements": [] })
        );
    }
}
