//! Card service that only logs what would be sent

use sicct_scenario::{CardService, ServiceFault, SessionContext, SubmitResponse};
use tracing::info;

/// Session id handed out by the dry-run service
pub(crate) const DRY_RUN_SESSION_ID: &str = "dry-run-session";

/// Accepts every call without contacting a card service
#[derive(Debug, Default)]
pub(crate) struct DryRunService {
    submitted: Vec<String>,
}

impl DryRunService {
    /// Tokens received so far
    pub(crate) fn submitted(&self) -> &[String] {
        &self.submitted
    }
}

impl CardService for DryRunService {
    fn do_open_session(
        &mut self,
        context: &SessionContext,
        card_handle: &str,
    ) -> Result<Option<String>, ServiceFault> {
        info!(
            card_handle,
            mandant = %context.mandant_id,
            client_system = %context.client_system_id,
            workplace = %context.workplace_id,
            user = %context.user_id,
            "[dry run] open session"
        );
        Ok(Some(DRY_RUN_SESSION_ID.to_string()))
    }

    fn do_submit_scenario(
        &mut self,
        _context: &SessionContext,
        token: &str,
    ) -> Result<SubmitResponse, ServiceFault> {
        info!(len = token.len(), "[dry run] submit scenario");
        self.submitted.push(token.to_string());
        Ok(SubmitResponse::ok())
    }

    fn do_close_session(
        &mut self,
        _context: &SessionContext,
        session_id: &str,
    ) -> Result<(), ServiceFault> {
        info!(%session_id, "[dry run] close session");
        Ok(())
    }
}
