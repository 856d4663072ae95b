//! Session orchestration against a card service
//!
//! ```text
//! Idle --open--> SessionOpen --submit--> SessionOpen --close--> Completed
//!   ^              |                                      |
//!   +--open fails--+                  close fails --------+--> Idle
//! ```
//!
//! Every step is attempted exactly once. Once a session has been opened,
//! [`SessionOrchestrator::run`] closes it whatever the submission outcome.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::builder::ScenarioBuilder;
use crate::config::ScenarioConfig;
use crate::document::ScenarioDocument;
use crate::error::{Error, Result, SignError};
use crate::signer::{INVALID_TOKEN, ScenarioSigner};

/// Caller identity attached to every service call
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionContext {
    /// Mandant (tenant) identifier
    pub mandant_id: String,
    /// Client system identifier
    pub client_system_id: String,
    /// Workplace identifier
    pub workplace_id: String,
    /// User identifier
    pub user_id: String,
}

impl SessionContext {
    /// Create a context from its four identifiers
    pub fn new(
        mandant_id: impl Into<String>,
        client_system_id: impl Into<String>,
        workplace_id: impl Into<String>,
        user_id: impl Into<String>,
    ) -> Self {
        Self {
            mandant_id: mandant_id.into(),
            client_system_id: client_system_id.into(),
            workplace_id: workplace_id.into(),
            user_id: user_id.into(),
        }
    }
}

/// Fault reported by the card service
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("[{code}] {message}")]
pub struct ServiceFault {
    /// Fault code
    pub code: String,
    /// Human readable detail
    pub message: String,
}

impl ServiceFault {
    /// Create a fault
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Result status of a scenario submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SubmitResult {
    /// Scenario executed
    Ok,
    /// Scenario executed with warnings
    Warning,
    /// Scenario rejected
    Error,
}

/// Response to a scenario submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitResponse {
    /// Result status
    pub result: SubmitResult,
    /// Error detail, if any
    pub error: Option<ServiceFault>,
}

impl SubmitResponse {
    /// Successful response without detail
    pub const fn ok() -> Self {
        Self {
            result: SubmitResult::Ok,
            error: None,
        }
    }

    /// Whether the scenario was executed
    pub const fn is_accepted(&self) -> bool {
        matches!(self.result, SubmitResult::Ok | SubmitResult::Warning)
    }
}

/// Remote service that opens card sessions and executes scenarios
///
/// Implementors provide the `do_*` methods; the provided methods wrap them
/// with logging. Timeouts and transport security belong to the implementor.
pub trait CardService: fmt::Debug {
    /// Open a session on a card, returning its id if one was assigned
    fn open_session(
        &mut self,
        context: &SessionContext,
        card_handle: &str,
    ) -> std::result::Result<Option<String>, ServiceFault> {
        debug!(card_handle, mandant = %context.mandant_id, "Opening session");
        let result = self.do_open_session(context, card_handle);
        match &result {
            Ok(Some(session_id)) => debug!(%session_id, "Session opened"),
            Ok(None) => debug!("Service returned no session id"),
            Err(fault) => debug!(%fault, "Open session fault"),
        }
        result
    }

    /// Implementation of [`CardService::open_session`]
    fn do_open_session(
        &mut self,
        context: &SessionContext,
        card_handle: &str,
    ) -> std::result::Result<Option<String>, ServiceFault>;

    /// Submit a signed scenario token
    fn submit_scenario(
        &mut self,
        context: &SessionContext,
        token: &str,
    ) -> std::result::Result<SubmitResponse, ServiceFault> {
        debug!(len = token.len(), "Submitting scenario");
        let result = self.do_submit_scenario(context, token);
        match &result {
            Ok(response) => debug!(result = ?response.result, "Scenario submitted"),
            Err(fault) => debug!(%fault, "Submit scenario fault"),
        }
        result
    }

    /// Implementation of [`CardService::submit_scenario`]
    fn do_submit_scenario(
        &mut self,
        context: &SessionContext,
        token: &str,
    ) -> std::result::Result<SubmitResponse, ServiceFault>;

    /// Close a session
    fn close_session(
        &mut self,
        context: &SessionContext,
        session_id: &str,
    ) -> std::result::Result<(), ServiceFault> {
        debug!(%session_id, "Closing session");
        let result = self.do_close_session(context, session_id);
        if let Err(fault) = &result {
            debug!(%fault, "Close session fault");
        }
        result
    }

    /// Implementation of [`CardService::close_session`]
    fn do_close_session(
        &mut self,
        context: &SessionContext,
        session_id: &str,
    ) -> std::result::Result<(), ServiceFault>;
}

/// Orchestrator state
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No session open
    #[default]
    Idle,
    /// A session is open
    SessionOpen {
        /// Id assigned by the service
        session_id: String,
    },
    /// The session was closed
    Completed,
}

/// What happened to a scenario submission
#[derive(Debug)]
pub enum SubmitOutcome {
    /// Service executed the scenario (result `Ok` or `Warning`)
    Accepted(SubmitResponse),
    /// Service answered with an error result
    Rejected(SubmitResponse),
    /// Service call itself failed
    Fault(ServiceFault),
    /// Scenario could not be signed and was not submitted
    NotSigned(SignError),
}

impl SubmitOutcome {
    /// Whether the scenario was executed
    pub const fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }
}

/// What happened when closing the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseOutcome {
    /// Session closed
    Closed,
    /// Close failed; never escalated
    Failed(ServiceFault),
}

/// Outcome of a full open, submit and close run
#[derive(Debug)]
pub struct RunReport {
    /// Session the scenario ran in
    pub session_id: String,
    /// Number of steps in the submitted scenario
    pub steps: usize,
    /// Submission outcome
    pub submit: SubmitOutcome,
    /// Close outcome, independent of the submission
    pub close: CloseOutcome,
}

impl RunReport {
    /// Whether the scenario was executed, regardless of the close outcome
    pub const fn is_success(&self) -> bool {
        self.submit.is_accepted()
    }
}

/// Drives one card session through open, submit and close
#[derive(Debug)]
pub struct SessionOrchestrator<S> {
    service: S,
    context: SessionContext,
    signer: ScenarioSigner,
    config: ScenarioConfig,
    invalid_token_fallback: bool,
    state: SessionState,
}

impl<S: CardService> SessionOrchestrator<S> {
    /// Create an idle orchestrator
    pub fn new(service: S, context: SessionContext, signer: ScenarioSigner) -> Self {
        Self {
            service,
            context,
            signer,
            config: ScenarioConfig::default(),
            invalid_token_fallback: false,
            state: SessionState::Idle,
        }
    }

    /// Use custom scenario settings
    pub fn with_scenario_config(mut self, config: ScenarioConfig) -> Self {
        self.config = config;
        self
    }

    /// Submit the `INVALID_JWT` placeholder when signing is not possible,
    /// instead of skipping the submission
    pub const fn with_invalid_token_fallback(mut self, enabled: bool) -> Self {
        self.invalid_token_fallback = enabled;
        self
    }

    /// Current state
    pub const fn state(&self) -> &SessionState {
        &self.state
    }

    /// Id of the open session
    pub fn session_id(&self) -> Option<&str> {
        match &self.state {
            SessionState::SessionOpen { session_id } => Some(session_id),
            _ => None,
        }
    }

    /// Session context sent with every call
    pub const fn context(&self) -> &SessionContext {
        &self.context
    }

    /// Card service
    pub const fn service(&self) -> &S {
        &self.service
    }

    /// Take back the card service
    pub fn into_service(self) -> S {
        self.service
    }

    /// Open a session on `card_handle`.
    ///
    /// A fault or a missing session id is [`Error::SessionOpenFailed`] and
    /// leaves the orchestrator idle.
    pub fn open(&mut self, card_handle: &str) -> Result<String> {
        if let Some(session_id) = self.session_id() {
            return Err(Error::SessionOpenFailed(format!(
                "session {session_id} is still open"
            )));
        }

        let reason = match self.service.open_session(&self.context, card_handle) {
            Ok(Some(session_id)) if !session_id.is_empty() => {
                info!(%session_id, card_handle, "Session open");
                self.state = SessionState::SessionOpen {
                    session_id: session_id.clone(),
                };
                return Ok(session_id);
            }
            Ok(_) => "no session id returned".to_string(),
            Err(fault) => fault.to_string(),
        };

        warn!(card_handle, %reason, "Failed to open session");
        self.state = SessionState::Idle;
        Err(Error::SessionOpenFailed(reason))
    }

    /// Build, sign and submit a scenario in the open session
    pub fn submit<I>(&mut self, apdus: I) -> Result<SubmitOutcome>
    where
        I: IntoIterator,
        I::Item: AsRef<[u8]>,
    {
        let session_id = self.session_id().ok_or(Error::NoOpenSession)?.to_string();
        let document = self.build_scenario(session_id, apdus);
        Ok(self.submit_document(&document))
    }

    fn build_scenario<I>(&self, session_id: String, apdus: I) -> ScenarioDocument
    where
        I: IntoIterator,
        I::Item: AsRef<[u8]>,
    {
        ScenarioBuilder::with_config(self.config.clone())
            .with_apdus(apdus)
            .build(session_id)
    }

    fn submit_document(&mut self, document: &ScenarioDocument) -> SubmitOutcome {
        let token = match self.signer.sign(document) {
            Ok(signed) => signed.into_string(),
            Err(err) if self.invalid_token_fallback => {
                warn!(%err, "Submitting placeholder token");
                INVALID_TOKEN.to_string()
            }
            Err(err) => {
                warn!(%err, "Scenario not signed, skipping submission");
                return SubmitOutcome::NotSigned(err);
            }
        };

        match self.service.submit_scenario(&self.context, &token) {
            Ok(response) if response.is_accepted() => {
                info!(result = ?response.result, steps = document.len(), "Scenario accepted");
                SubmitOutcome::Accepted(response)
            }
            Ok(response) => {
                warn!(error = ?response.error, "Scenario rejected");
                SubmitOutcome::Rejected(response)
            }
            Err(fault) => {
                warn!(%fault, "Scenario submission fault");
                SubmitOutcome::Fault(fault)
            }
        }
    }

    /// Close the open session; failures are reported, never escalated
    pub fn close(&mut self) -> Result<CloseOutcome> {
        let session_id = self.session_id().ok_or(Error::NoOpenSession)?.to_string();

        match self.service.close_session(&self.context, &session_id) {
            Ok(()) => {
                info!(%session_id, "Session closed");
                self.state = SessionState::Completed;
                Ok(CloseOutcome::Closed)
            }
            Err(fault) => {
                warn!(%session_id, %fault, "Failed to close session");
                self.state = SessionState::Idle;
                Ok(CloseOutcome::Failed(fault))
            }
        }
    }

    /// Open a session, submit the scenario and close the session.
    ///
    /// Only a failed open is returned as an error; once a session is open
    /// it is always closed.
    pub fn run<I>(&mut self, card_handle: &str, apdus: I) -> Result<RunReport>
    where
        I: IntoIterator,
        I::Item: AsRef<[u8]>,
    {
        let session_id = self.open(card_handle)?;
        let document = self.build_scenario(session_id.clone(), apdus);
        let submit = self.submit_document(&document);
        let close = self.close()?;

        Ok(RunReport {
            session_id,
            steps: document.len(),
            submit,
            close,
        })
    }
}

#[cfg(test)]
mod tests {
    use base64::prelude::*;
    use hex_literal::hex;

    use super::*;
    use crate::signer::SigningMaterial;

    const EC_KEY: &str = include_str!("../tests/fixtures/ec_key.pem");
    const EC_CERT: &str = include_str!("../tests/fixtures/ec_cert.pem");

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        Open(String),
        Submit(String),
        Close(String),
    }

    #[derive(Debug, Default)]
    struct MockService {
        session_id: Option<String>,
        open_fault: Option<ServiceFault>,
        submit: Option<std::result::Result<SubmitResponse, ServiceFault>>,
        close_fault: Option<ServiceFault>,
        calls: Vec<Call>,
    }

    impl MockService {
        fn with_session(session_id: &str) -> Self {
            Self {
                session_id: Some(session_id.to_string()),
                submit: Some(Ok(SubmitResponse::ok())),
                ..Self::default()
            }
        }
    }

    impl CardService for MockService {
        fn do_open_session(
            &mut self,
            _context: &SessionContext,
            card_handle: &str,
        ) -> std::result::Result<Option<String>, ServiceFault> {
            self.calls.push(Call::Open(card_handle.to_string()));
            match &self.open_fault {
                Some(fault) => Err(fault.clone()),
                None => Ok(self.session_id.clone()),
            }
        }

        fn do_submit_scenario(
            &mut self,
            _context: &SessionContext,
            token: &str,
        ) -> std::result::Result<SubmitResponse, ServiceFault> {
            self.calls.push(Call::Submit(token.to_string()));
            self.submit
                .clone()
                .unwrap_or_else(|| Err(ServiceFault::new("E", "no response")))
        }

        fn do_close_session(
            &mut self,
            _context: &SessionContext,
            session_id: &str,
        ) -> std::result::Result<(), ServiceFault> {
            self.calls.push(Call::Close(session_id.to_string()));
            match &self.close_fault {
                Some(fault) => Err(fault.clone()),
                None => Ok(()),
            }
        }
    }

    fn context() -> SessionContext {
        SessionContext::new("M", "C", "W", "U")
    }

    fn signer() -> ScenarioSigner {
        ScenarioSigner::new(SigningMaterial::from_pem(EC_KEY, EC_CERT).unwrap())
    }

    fn new_orchestrator(service: MockService) -> SessionOrchestrator<MockService> {
        SessionOrchestrator::new(service, context(), signer())
    }

    #[test]
    fn test_run_happy_path() {
        let mut orchestrator = new_orchestrator(MockService::with_session("sess-1"));
        let report = orchestrator
            .run("0000-1111", [hex!("00A4040C"), hex!("00A4040C")])
            .unwrap();

        assert!(report.is_success());
        assert_eq!(report.session_id, "sess-1");
        assert_eq!(report.steps, 1);
        assert_eq!(report.close, CloseOutcome::Closed);
        assert_eq!(orchestrator.state(), &SessionState::Completed);

        let calls = orchestrator.into_service().calls;
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[0], Call::Open("0000-1111".into()));
        assert!(matches!(&calls[1], Call::Submit(token) if token.split('.').count() == 3));
        assert_eq!(calls[2], Call::Close("sess-1".into()));
    }

    #[test]
    fn test_scenario_uses_open_session_id() {
        let mut orchestrator = new_orchestrator(MockService::with_session("sess-42"));
        orchestrator.run("handle", [hex!("00B00000")]).unwrap();

        let calls = orchestrator.into_service().calls;
        let Call::Submit(token) = &calls[1] else {
            panic!("expected submit, got {:?}", calls[1]);
        };
        let signed_payload = token.split('.').nth(1).unwrap();
        let json = BASE64_URL_SAFE_NO_PAD.decode(signed_payload).unwrap();
        let json = String::from_utf8(json).unwrap();
        assert!(json.contains(r#""clientSessionId":"sess-42""#));
    }

    #[test]
    fn test_failed_submit_still_closes_once() {
        let mut service = MockService::with_session("sess-2");
        service.submit = Some(Err(ServiceFault::new("SOAP", "timeout")));
        let mut orchestrator = new_orchestrator(service);

        let report = orchestrator.run("h", [hex!("00A4040C")]).unwrap();
        assert!(matches!(&report.submit, SubmitOutcome::Fault(fault) if fault.code == "SOAP"));
        assert_eq!(report.close, CloseOutcome::Closed);

        let calls = orchestrator.into_service().calls;
        assert_eq!(
            calls.iter().filter(|c| matches!(c, Call::Submit(_))).count(),
            1
        );
        assert_eq!(calls.last(), Some(&Call::Close("sess-2".into())));
    }

    #[test]
    fn test_rejected_result() {
        let mut service = MockService::with_session("s");
        service.submit = Some(Ok(SubmitResponse {
            result: SubmitResult::Error,
            error: Some(ServiceFault::new("4711", "bad scenario")),
        }));
        let report = new_orchestrator(service).run("h", [hex!("00A4040C")]).unwrap();
        assert!(matches!(report.submit, SubmitOutcome::Rejected(_)));
        assert!(!report.is_success());
    }

    #[test]
    fn test_warning_result_is_accepted() {
        let mut service = MockService::with_session("s");
        service.submit = Some(Ok(SubmitResponse {
            result: SubmitResult::Warning,
            error: None,
        }));
        let report = new_orchestrator(service).run("h", [hex!("00A4040C")]).unwrap();
        assert!(report.is_success());
    }

    #[test]
    fn test_open_failure_returns_to_idle() {
        let mut orchestrator = new_orchestrator(MockService::default());
        let err = orchestrator.run("h", [hex!("00A4040C")]).unwrap_err();
        assert!(matches!(err, Error::SessionOpenFailed(_)));
        assert_eq!(orchestrator.state(), &SessionState::Idle);

        let mut service = MockService::with_session("s");
        service.open_fault = Some(ServiceFault::new("F", "card missing"));
        let mut orchestrator = new_orchestrator(service);
        let err = orchestrator.open("h").unwrap_err();
        assert!(matches!(err, Error::SessionOpenFailed(reason) if reason.contains("card missing")));
        assert_eq!(orchestrator.into_service().calls.len(), 1);
    }

    #[test]
    fn test_close_failure_keeps_accepted_submission() {
        let mut service = MockService::with_session("s");
        service.close_fault = Some(ServiceFault::new("F", "gone"));
        let mut orchestrator = new_orchestrator(service);

        let report = orchestrator.run("h", [hex!("00A4040C")]).unwrap();
        assert!(report.is_success());
        assert!(matches!(report.close, CloseOutcome::Failed(_)));
        assert_eq!(orchestrator.state(), &SessionState::Idle);
    }

    #[test]
    fn test_unsigned_scenario_is_not_submitted() {
        let mut orchestrator = SessionOrchestrator::new(
            MockService::with_session("s"),
            context(),
            ScenarioSigner::unavailable(),
        );
        let report = orchestrator.run("h", [hex!("00A4040C")]).unwrap();
        assert!(matches!(
            report.submit,
            SubmitOutcome::NotSigned(SignError::Unavailable)
        ));
        assert_eq!(report.close, CloseOutcome::Closed);

        let calls = orchestrator.into_service().calls;
        assert!(!calls.iter().any(|c| matches!(c, Call::Submit(_))));
    }

    #[test]
    fn test_invalid_token_fallback_submits_placeholder() {
        let mut orchestrator = SessionOrchestrator::new(
            MockService::with_session("s"),
            context(),
            ScenarioSigner::unavailable(),
        )
        .with_invalid_token_fallback(true);
        orchestrator.run("h", [hex!("00A4040C")]).unwrap();

        let calls = orchestrator.into_service().calls;
        assert_eq!(calls[1], Call::Submit(INVALID_TOKEN.into()));
    }

    #[test]
    fn test_step_methods_require_open_session() {
        let mut orchestrator = new_orchestrator(MockService::with_session("s"));
        assert!(matches!(
            orchestrator.submit([hex!("00A4040C")]),
            Err(Error::NoOpenSession)
        ));
        assert!(matches!(orchestrator.close(), Err(Error::NoOpenSession)));

        orchestrator.open("h").unwrap();
        assert!(matches!(
            orchestrator.open("h"),
            Err(Error::SessionOpenFailed(_))
        ));
        assert_eq!(orchestrator.session_id(), Some("s"));
    }
}
