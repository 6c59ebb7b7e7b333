//! Element builder — Excalidraw element schema and construction.
//!
//! DESIGN
//! ======
//! Every element carries the shared field set (identity, position, fixed
//! style defaults, revision metadata). Kind-specific fields live in the
//! `Shape` enum, which is flattened into the element and tagged by `type`,
//! so a rectangle can never carry text fields and an arrow never carries a
//! size. Arrow and line point data is not modeled yet.
//!
//! `versionNonce` must not collide within one generated diagram. Single
//! elements draw a random nonce; `ElementBatch` tracks issued nonces and
//! redraws on collision.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// DEFAULTS
// =============================================================================

pub const DEFAULT_WIDTH: f64 = 100.0;
pub const DEFAULT_HEIGHT: f64 = 100.0;
pub const DEFAULT_TEXT: &str = "Sample Text";

pub const STROKE_COLOR: &str = "#000000";
pub const BACKGROUND_COLOR: &str = "transparent";
pub const FILL_STYLE: &str = "hachure";
pub const STROKE_WIDTH: u32 = 1;
pub const STROKE_STYLE: &str = "solid";
pub const ROUGHNESS: u32 = 1;
pub const OPACITY: u32 = 100;

pub const FONT_SIZE: u32 = 20;
pub const FONT_FAMILY: u32 = 1;
pub const BASELINE: u32 = 18;

/// Elements are write-once here; the revision counter never advances.
pub const INITIAL_VERSION: u32 = 1;

// =============================================================================
// ERROR
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ElementError {
    #[error("unknown element type '{0}' (expected one of rectangle, ellipse, text, arrow, line, diamond)")]
    UnknownKind(String),
}

// =============================================================================
// KIND
// =============================================================================

/// Closed set of element types the renderer accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Rectangle,
    Ellipse,
    Text,
    Arrow,
    Line,
    Diamond,
}

impl ElementKind {
    pub const ALL: [ElementKind; 6] = [
        ElementKind::Rectangle,
        ElementKind::Ellipse,
        ElementKind::Text,
        ElementKind::Arrow,
        ElementKind::Line,
        ElementKind::Diamond,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Rectangle => "rectangle",
            Self::Ellipse => "ellipse",
            Self::Text => "text",
            Self::Arrow => "arrow",
            Self::Line => "line",
            Self::Diamond => "diamond",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ElementKind {
    type Err = ElementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ElementError::UnknownKind(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalAlign {
    #[default]
    Top,
    Middle,
    Bottom,
}

// =============================================================================
// ELEMENT
// =============================================================================

/// Kind-specific fields. Serialized inline with the element, keyed by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Shape {
    Rectangle { width: f64, height: f64 },
    Ellipse { width: f64, height: f64 },
    Diamond { width: f64, height: f64 },
    Text(TextBody),
    Arrow,
    Line,
}

impl Shape {
    #[must_use]
    pub fn kind(&self) -> ElementKind {
        match self {
            Self::Rectangle { .. } => ElementKind::Rectangle,
            Self::Ellipse { .. } => ElementKind::Ellipse,
            Self::Diamond { .. } => ElementKind::Diamond,
            Self::Text(_) => ElementKind::Text,
            Self::Arrow => ElementKind::Arrow,
            Self::Line => ElementKind::Line,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextBody {
    pub width: f64,
    pub height: f64,
    pub text: String,
    pub font_size: u32,
    pub font_family: u32,
    pub text_align: TextAlign,
    pub vertical_align: VerticalAlign,
    pub baseline: u32,
}

/// Reference from a container to an element bound to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundElement {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ElementKind,
}

/// A fully populated Excalidraw element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramElement {
    pub id: String,
    #[serde(flatten)]
    pub shape: Shape,
    pub x: f64,
    pub y: f64,
    pub stroke_color: String,
    pub background_color: String,
    pub fill_style: String,
    pub stroke_width: u32,
    pub stroke_style: String,
    pub roughness: u32,
    pub opacity: u32,
    pub angle: f64,
    pub version: u32,
    pub version_nonce: u32,
    pub is_deleted: bool,
    pub bound_elements: Option<Vec<BoundElement>>,
    /// Milliseconds since Unix epoch.
    pub updated: i64,
    pub link: Option<String>,
    pub locked: bool,
}

impl DiagramElement {
    #[must_use]
    pub fn kind(&self) -> ElementKind {
        self.shape.kind()
    }
}

// =============================================================================
// SPEC
// =============================================================================

/// Input to the builder: what a generator asks for, before defaults apply.
///
/// Deserializes from the generator's per-element JSON. Style keys the model
/// echoes back are ignored; only kind, geometry, and text are read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementSpec {
    #[serde(rename = "type")]
    pub kind: ElementKind,
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl ElementSpec {
    #[must_use]
    pub fn new(kind: ElementKind, x: f64, y: f64) -> Self {
        Self { kind, x, y, width: None, height: None, text: None }
    }

    #[must_use]
    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Build the kind-specific fields, applying size and text defaults.
    fn shape(&self) -> Shape {
        let width = positive_or(self.width, DEFAULT_WIDTH);
        let height = positive_or(self.height, DEFAULT_HEIGHT);
        match self.kind {
            ElementKind::Rectangle => Shape::Rectangle { width, height },
            ElementKind::Ellipse => Shape::Ellipse { width, height },
            ElementKind::Diamond => Shape::Diamond { width, height },
            ElementKind::Text => Shape::Text(TextBody {
                width,
                height,
                text: self
                    .text
                    .clone()
                    .unwrap_or_else(|| DEFAULT_TEXT.to_string()),
                font_size: FONT_SIZE,
                font_family: FONT_FAMILY,
                text_align: TextAlign::default(),
                vertical_align: VerticalAlign::default(),
                baseline: BASELINE,
            }),
            ElementKind::Arrow => Shape::Arrow,
            ElementKind::Line => Shape::Line,
        }
    }
}

fn positive_or(value: Option<f64>, default: f64) -> f64 {
    match value {
        Some(v) if v > 0.0 && v.is_finite() => v,
        _ => default,
    }
}

// =============================================================================
// BUILDER
// =============================================================================

/// Current time as milliseconds since Unix epoch.
fn now_ms() -> i64 {
    let Ok(dur) = SystemTime::now().duration_since(UNIX_EPOCH) else {
        return 0;
    };
    i64::try_from(dur.as_millis()).unwrap_or(0)
}

fn assemble(spec: &ElementSpec, version_nonce: u32) -> DiagramElement {
    DiagramElement {
        id: Uuid::new_v4().to_string(),
        shape: spec.shape(),
        x: spec.x,
        y: spec.y,
        stroke_color: STROKE_COLOR.to_string(),
        background_color: BACKGROUND_COLOR.to_string(),
        fill_style: FILL_STYLE.to_string(),
        stroke_width: STROKE_WIDTH,
        stroke_style: STROKE_STYLE.to_string(),
        roughness: ROUGHNESS,
        opacity: OPACITY,
        angle: 0.0,
        version: INITIAL_VERSION,
        version_nonce,
        is_deleted: false,
        bound_elements: None,
        updated: now_ms(),
        link: None,
        locked: false,
    }
}

/// Build one element with a fresh id and a random `versionNonce`.
///
/// Use [`ElementBatch`] when several elements go into the same diagram.
#[must_use]
pub fn build_element(spec: &ElementSpec) -> DiagramElement {
    assemble(spec, rand::random())
}

/// Elements built for one diagram. Guarantees distinct ids and nonces.
#[derive(Debug, Default)]
pub struct ElementBatch {
    ids: HashSet<String>,
    nonces: HashSet<u32>,
    elements: Vec<DiagramElement>,
}

impl ElementBatch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            ids: HashSet::with_capacity(capacity),
            nonces: HashSet::with_capacity(capacity),
            elements: Vec::with_capacity(capacity),
        }
    }

    /// Build `spec` into the batch and return the new element.
    pub fn push(&mut self, spec: &ElementSpec) -> &DiagramElement {
        let nonce = self.fresh_nonce();
        let mut element = assemble(spec, nonce);
        while !self.ids.insert(element.id.clone()) {
            element.id = Uuid::new_v4().to_string();
        }
        let index = self.elements.len();
        self.elements.push(element);
        &self.elements[index]
    }

    fn fresh_nonce(&mut self) -> u32 {
        loop {
            let nonce = rand::random();
            if self.nonces.insert(nonce) {
                return nonce;
            }
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    #[must_use]
    pub fn into_elements(self) -> Vec<DiagramElement> {
        self.elements
    }
}

#[cfg(test)]
#[path = "element_test.rs"]
mod tests;
