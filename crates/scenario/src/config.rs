//! Scenario document defaults

use serde::{Deserialize, Serialize};
use sicct_apdu_core::{StatusWord, status::common};

use crate::error::{Error, Result};

/// Document type tag of a standard scenario
pub const DEFAULT_DOCUMENT_TYPE: &str = "StandardScenario";

/// Scenario format version
pub const DEFAULT_VERSION: &str = "1.0.0";

/// First sequence counter of a session
pub const DEFAULT_SEQUENCE_COUNTER: u32 = 1;

/// Nominal time span of a scenario in milliseconds
pub const DEFAULT_TIME_SPAN: u32 = 1000;

/// Settings applied to every scenario document a builder produces
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    /// Document type tag
    #[serde(rename = "type")]
    pub doc_type: String,

    /// Format version
    pub version: String,

    /// Starting sequence counter
    pub sequence_counter: u32,

    /// Nominal time span
    pub time_span: u32,

    /// Status words every step accepts
    pub expected_status_words: Vec<StatusWord>,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            doc_type: DEFAULT_DOCUMENT_TYPE.to_string(),
            version: DEFAULT_VERSION.to_string(),
            sequence_counter: DEFAULT_SEQUENCE_COUNTER,
            time_span: DEFAULT_TIME_SPAN,
            expected_status_words: vec![common::SUCCESS, common::NO_PRECISE_DIAGNOSIS],
        }
    }
}

impl ScenarioConfig {
    /// Create the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the document type tag
    pub fn with_doc_type(mut self, doc_type: impl Into<String>) -> Self {
        self.doc_type = doc_type.into();
        self
    }

    /// Set the format version
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Set the starting sequence counter
    pub const fn with_sequence_counter(mut self, sequence_counter: u32) -> Self {
        self.sequence_counter = sequence_counter;
        self
    }

    /// Set the nominal time span
    pub const fn with_time_span(mut self, time_span: u32) -> Self {
        self.time_span = time_span;
        self
    }

    /// Set the status words every step accepts
    pub fn with_expected_status_words(mut self, status_words: Vec<StatusWord>) -> Self {
        self.expected_status_words = status_words;
        self
    }

    /// Set the accepted status words from hex strings such as `"9000"`
    pub fn with_expected_status_words_hex<I, S>(self, status_words: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let parsed = status_words
            .into_iter()
            .map(|sw| {
                let sw = sw.as_ref();
                sw.parse::<StatusWord>()
                    .map_err(|_| Error::InvalidStatusWord(sw.to_string()))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(self.with_expected_status_words(parsed))
    }
}
