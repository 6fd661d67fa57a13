//! Worker protocol - JSON request/response definitions

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::generation::{GenerationParams, GeneratorKind, ResolvedColumn, SelectorKind};
use crate::mesh::vertex::Vertex;

/// Requests sent to a background worker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum WorkerRequest {
    /// Run recursion passes over a copied section
    #[serde(rename = "recurseSection")]
    RecurseSection(RecurseSectionRequest),
}

/// Everything a worker needs to rebuild the generation context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurseSectionRequest {
    pub seed: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colors: Option<HashMap<String, [f32; 3]>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub water_level: Option<f32>,
    pub section: SectionPayload,
    pub generator_selector: SelectorKind,
    pub generators: Vec<GeneratorKind>,
    pub generation_params: GenerationParams,
    pub levels: u32,
    pub size: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub noise_amplitude: Option<f32>,
    /// Digging mode at dispatch time
    #[serde(default)]
    pub digging: bool,
    /// Colorer columns already resolved around the section
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub columns: Vec<ResolvedColumn>,
}

/// Copied vertices of a section and where they live in the full buffer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionPayload {
    pub vertices: Vec<Vertex>,
    pub absolute_index: usize,
}

/// Responses from a background worker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status")]
pub enum WorkerResponse {
    #[serde(rename = "ok")]
    Ok {
        vertices: Vec<Vertex>,
        /// Colorer columns resolved by the worker
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        columns: Vec<ResolvedColumn>,
    },
    #[serde(rename = "error")]
    Error { message: String },
}

impl WorkerResponse {
    pub fn error(message: impl Into<String>) -> Self {
        WorkerResponse::Error { message: message.into() }
    }

    /// One newline-terminated JSON line. A response that fails to serialize
    /// is replaced by an error response carrying the reason.
    pub fn to_json_line(&self) -> String {
        let mut line = serde_json::to_string(self).unwrap_or_else(|e| {
            let fallback = WorkerResponse::error(format!("Serialize error: {}", e));
            serde_json::to_string(&fallback)
                .unwrap_or_else(|_| r#"{"status":"error","message":"Serialize error"}"#.to_string())
        });
        line.push('\n');
        line
    }
}
