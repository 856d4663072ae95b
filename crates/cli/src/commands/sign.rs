//! Scenario signing

use sicct_scenario::INVALID_TOKEN;
use tracing::info;

use super::scenario::build_document;
use crate::config::Config;
use crate::utils::{ApduSource, display::warning, load_signer};

/// Print the compact token, or the invalid placeholder if signing fails
pub(crate) fn sign_command(
    config: &Config,
    source: &ApduSource,
    session_id: Option<&str>,
) -> eyre::Result<()> {
    let document = build_document(config, source, session_id)?;
    let signer = load_signer(config);

    match signer.sign(&document) {
        Ok(signed) => {
            info!(algorithm = %signed.algorithm(), steps = document.len(), "Scenario signed");
            println!("{signed}");
        }
        Err(e) => {
            eprintln!("{}", warning(&format!("{e}, printing placeholder token")));
            println!("{INVALID_TOKEN}");
        }
    }
    Ok(())
}
