//! Session run against a card service

use eyre::bail;
use sicct_scenario::{CloseOutcome, RunReport, SessionOrchestrator, SubmitOutcome};

use crate::config::Config;
use crate::service::DryRunService;
use crate::utils::{
    ApduSource,
    display::{failure, key_value_box, success, warning},
    load_signer,
};

/// Run open, submit and close for the given APDUs
pub(crate) fn send_command(
    config: &Config,
    source: &ApduSource,
    card_handle: Option<&str>,
    dry_run: bool,
) -> eyre::Result<()> {
    if !dry_run {
        bail!("no card service transport is built in, use --dry-run");
    }

    let apdus = source.collect(config)?;
    let card_handle = card_handle.unwrap_or(&config.card_handle);

    let mut orchestrator = SessionOrchestrator::new(
        DryRunService::default(),
        config.context.clone().into(),
        load_signer(config),
    )
    .with_scenario_config(config.scenario.clone());

    let report = orchestrator.run(card_handle, apdus)?;
    print_report(&report);
    println!(
        "{}",
        key_value_box(
            "Dry run",
            vec![
                ("Card handle", card_handle.to_string()),
                (
                    "Tokens submitted",
                    orchestrator.service().submitted().len().to_string()
                ),
            ],
        )
    );
    Ok(())
}

fn print_report(report: &RunReport) {
    println!(
        "{}",
        key_value_box(
            "Session",
            vec![
                ("Session id", report.session_id.clone()),
                ("Steps", report.steps.to_string()),
            ],
        )
    );

    let submit = match &report.submit {
        SubmitOutcome::Accepted(response) => {
            success(&format!("Scenario accepted ({:?})", response.result))
        }
        SubmitOutcome::Rejected(response) => match &response.error {
            Some(fault) => failure(&format!("Scenario rejected: {fault}")),
            None => failure("Scenario rejected"),
        },
        SubmitOutcome::Fault(fault) => failure(&format!("Submission failed: {fault}")),
        SubmitOutcome::NotSigned(e) => warning(&format!("Scenario not submitted: {e}")),
    };
    println!("{submit}");

    let close = match &report.close {
        CloseOutcome::Closed => success("Session closed"),
        CloseOutcome::Failed(fault) => warning(&format!("Session close failed: {fault}")),
    };
    println!("{close}");
}
