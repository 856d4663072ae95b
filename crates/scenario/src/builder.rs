//! Scenario assembly from command APDUs
//!
//! Every APDU is reduced to its canonical hex form (upper-case, no
//! separators) and steps whose hex was already seen are dropped, so the
//! first occurrence of a command decides its position.

use std::collections::HashSet;

use sicct_apdu_core::util::{canonical_hex, decode_hex};
use tracing::{debug, trace};

use crate::config::ScenarioConfig;
use crate::document::{ScenarioDocument, ScenarioStep};
use crate::error::{Error, Result};

/// Collects command APDUs into a [`ScenarioDocument`]
#[derive(Debug, Clone, Default)]
pub struct ScenarioBuilder {
    config: ScenarioConfig,
    commands: Vec<String>,
    seen: HashSet<String>,
}

impl ScenarioBuilder {
    /// Builder with the default scenario settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder with custom scenario settings
    pub fn with_config(config: ScenarioConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Settings used for the produced document
    pub const fn config(&self) -> &ScenarioConfig {
        &self.config
    }

    /// Add one command, returning `false` if it duplicates an earlier one
    pub fn push(&mut self, apdu: impl AsRef<[u8]>) -> bool {
        let hex = canonical_hex(apdu.as_ref());
        if self.seen.contains(&hex) {
            trace!(apdu = %hex, "Skipping duplicate step");
            return false;
        }
        self.seen.insert(hex.clone());
        self.commands.push(hex);
        true
    }

    /// Add one command given as hex in any case, whitespace ignored
    pub fn push_hex(&mut self, hex: &str) -> Result<bool> {
        let bytes = decode_hex(hex).map_err(Error::InvalidApduHex)?;
        Ok(self.push(bytes))
    }

    /// Add a sequence of commands in order
    pub fn with_apdus<I>(mut self, apdus: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<[u8]>,
    {
        for apdu in apdus {
            self.push(apdu);
        }
        self
    }

    /// Add a sequence of hex commands in order
    pub fn with_hex_apdus<I, S>(mut self, apdus: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for apdu in apdus {
            self.push_hex(apdu.as_ref())?;
        }
        Ok(self)
    }

    /// Number of distinct commands collected
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether no command was collected
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Produce the document for a session.
    ///
    /// An empty builder yields a document without steps.
    pub fn build(&self, session_id: impl Into<String>) -> ScenarioDocument {
        let steps: Vec<_> = self
            .commands
            .iter()
            .map(|command| ScenarioStep {
                command_apdu: command.clone(),
                expected_status_words: self.config.expected_status_words.clone(),
            })
            .collect();

        let document = ScenarioDocument {
            doc_type: self.config.doc_type.clone(),
            version: self.config.version.clone(),
            client_session_id: session_id.into(),
            sequence_counter: self.config.sequence_counter,
            time_span: self.config.time_span,
            steps,
        };
        debug!(
            session_id = %document.client_session_id,
            steps = document.len(),
            "Scenario built"
        );
        document
    }
}

#[cfg(test)]
mod tests {
    use hex_literal::hex;

    use super::*;

    #[test]
    fn test_duplicates_keep_first_occurrence() {
        let document = ScenarioBuilder::new()
            .with_hex_apdus(["00A4040C", "00A4040C", "00B00000"])
            .unwrap()
            .build("session");
        let commands: Vec<_> = document.command_apdus().collect();
        assert_eq!(commands, ["00A4040C", "00B00000"]);
    }

    #[test]
    fn test_dedupe_is_case_and_spacing_insensitive() {
        let mut builder = ScenarioBuilder::new();
        assert!(builder.push_hex("00 b0 00 00").unwrap());
        assert!(!builder.push_hex("00B00000").unwrap());
        assert!(!builder.push(hex!("00B00000")));
        assert!(builder.push(hex!("00B0000001")));
        assert_eq!(builder.len(), 2);
    }

    #[test]
    fn test_empty_input_is_valid() {
        let document = ScenarioBuilder::new().build("s");
        assert!(document.is_empty());
        assert_eq!(document.client_session_id, "s");
    }

    #[test]
    fn test_config_flows_into_document() {
        let config = ScenarioConfig::new()
            .with_doc_type("Custom")
            .with_sequence_counter(7)
            .with_time_span(50)
            .with_expected_status_words_hex(["9000"])
            .unwrap();
        let document = ScenarioBuilder::with_config(config)
            .with_apdus([hex!("00A4040C")])
            .build("abc");

        assert_eq!(document.doc_type, "Custom");
        assert_eq!(document.version, "1.0.0");
        assert_eq!(document.sequence_counter, 7);
        assert_eq!(document.time_span, 50);
        assert_eq!(document.steps[0].expected_status_words.len(), 1);
    }

    #[test]
    fn test_invalid_hex_is_rejected() {
        let err = ScenarioBuilder::new().push_hex("00A4G").unwrap_err();
        assert!(matches!(err, Error::InvalidApduHex(_)));
    }
}
