//! Scenario document output

use sicct_scenario::{ScenarioBuilder, ScenarioDocument};
use tracing::debug;

use crate::config::Config;
use crate::utils::ApduSource;

/// Build the scenario document for the given source
pub(crate) fn build_document(
    config: &Config,
    source: &ApduSource,
    session_id: Option<&str>,
) -> eyre::Result<ScenarioDocument> {
    let apdus = source.collect(config)?;
    let session_id = session_id.unwrap_or(&config.card_handle);
    debug!(apdus = apdus.len(), %session_id, "Building scenario");

    Ok(ScenarioBuilder::with_config(config.scenario.clone())
        .with_apdus(apdus)
        .build(session_id))
}

/// Print the scenario document as JSON
pub(crate) fn scenario_command(
    config: &Config,
    source: &ApduSource,
    session_id: Option<&str>,
) -> eyre::Result<()> {
    let document = build_document(config, source, session_id)?;
    println!("{}", document.to_json_pretty()?);
    Ok(())
}
