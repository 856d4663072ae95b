//! Helpers shared by the sicct-replay commands

pub(crate) mod display;

use std::path::PathBuf;

use clap::Args;
use eyre::WrapErr;
use sicct_apdu_core::{Bytes, util::decode_hex};
use sicct_capture::ApduExtractor;
use sicct_scenario::{ScenarioSigner, SigningMaterial};
use tracing::{info, warn};

use crate::config::Config;

/// Where the APDUs of a scenario come from
#[derive(Args, Debug, Clone, Default)]
pub(crate) struct ApduSource {
    /// Capture file to extract APDUs from
    pub(crate) capture: Option<PathBuf>,

    /// Command APDU in hex, may be repeated
    #[arg(long = "apdu", value_name = "HEX")]
    pub(crate) apdus: Vec<String>,

    /// Keep only captured APDUs whose instruction is in the table
    #[arg(long)]
    pub(crate) known_only: bool,
}

impl ApduSource {
    /// Collect the APDUs in order: capture first, then `--apdu` values.
    ///
    /// Falls back to the configured test APDUs when neither is given.
    pub(crate) fn collect(&self, config: &Config) -> eyre::Result<Vec<Bytes>> {
        let mut apdus = Vec::new();

        if let Some(path) = &self.capture {
            let extraction = ApduExtractor::new()
                .extract_file(path)
                .wrap_err_with(|| format!("failed to read capture {}", path.display()))?;
            let extracted = if self.known_only {
                extraction.known_raw()
            } else {
                extraction.raw()
            };
            info!(count = extracted.len(), "APDUs taken from capture");
            apdus.extend(extracted);
        }

        for hex in &self.apdus {
            apdus.push(decode_hex(hex).wrap_err_with(|| format!("invalid --apdu {hex:?}"))?);
        }

        if self.capture.is_none() && self.apdus.is_empty() {
            info!(count = config.test_apdus.len(), "Using configured test APDUs");
            for hex in &config.test_apdus {
                apdus.push(
                    decode_hex(hex).wrap_err_with(|| format!("invalid test APDU {hex:?}"))?,
                );
            }
        }

        Ok(apdus)
    }
}

/// Build a signer from the configured key material.
///
/// Missing or unreadable material yields a signer without a key so callers
/// can still produce diagnostics.
pub(crate) fn load_signer(config: &Config) -> ScenarioSigner {
    let (Some(key), Some(certificates)) = (&config.signing.key, &config.signing.certificates)
    else {
        warn!("No signing key configured");
        return ScenarioSigner::unavailable();
    };

    match SigningMaterial::load(key, certificates) {
        Ok(material) => ScenarioSigner::new(material),
        Err(e) => {
            warn!(error = %e, key = %key.display(), "Failed to load signing material");
            ScenarioSigner::unavailable()
        }
    }
}
