//! Scenario document model and its JSON shape

use serde::{Deserialize, Serialize};
use sicct_apdu_core::StatusWord;

/// One command APDU and the status words it may answer with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioStep {
    /// Canonical upper-case hex of the command
    pub command_apdu: String,
    /// Accepted status words
    pub expected_status_words: Vec<StatusWord>,
}

/// An ordered batch of APDU steps bound to one session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioDocument {
    /// Document type tag
    #[serde(rename = "type")]
    pub doc_type: String,
    /// Format version
    pub version: String,
    /// Session the scenario is submitted in
    pub client_session_id: String,
    /// Sequence counter within the session
    pub sequence_counter: u32,
    /// Nominal time span
    pub time_span: u32,
    /// Steps in submission order
    pub steps: Vec<ScenarioStep>,
}

impl ScenarioDocument {
    /// Number of steps
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the scenario carries no steps
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Command hex strings in step order
    pub fn command_apdus(&self) -> impl Iterator<Item = &str> {
        self.steps.iter().map(|step| step.command_apdu.as_str())
    }

    /// Pretty-printed JSON of the document
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Envelope carried as the token payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioMessage {
    /// The wrapped scenario
    pub message: ScenarioDocument,
}

impl From<ScenarioDocument> for ScenarioMessage {
    fn from(message: ScenarioDocument) -> Self {
        Self { message }
    }
}
