//! Scenario building, signing and session orchestration
//!
//! A scenario is an ordered, deduplicated batch of command APDUs bound to a
//! card session. This crate
//!
//! - assembles scenarios with [`ScenarioBuilder`]
//! - signs them into compact tokens with [`ScenarioSigner`]
//! - drives a [`CardService`] through open, submit and close with
//!   [`SessionOrchestrator`]
//!
//! ```no_run
//! use sicct_scenario::{ScenarioBuilder, ScenarioSigner, SigningMaterial};
//!
//! let document = ScenarioBuilder::new()
//!     .with_hex_apdus(["00A4040C", "00B00000"])?
//!     .build("session-1");
//!
//! let material = SigningMaterial::load("key.pem", "chain.pem")?;
//! let token = ScenarioSigner::new(material).sign(&document)?;
//! println!("{token}");
//! # Ok::<(), sicct_scenario::Error>(())
//! ```
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![forbid(unsafe_code)]
#![warn(missing_docs, rustdoc::missing_crate_level_docs)]

pub mod builder;
pub mod config;
pub mod document;
pub mod error;
pub mod session;
pub mod signer;

pub use builder::ScenarioBuilder;
pub use config::ScenarioConfig;
pub use document::{ScenarioDocument, ScenarioMessage, ScenarioStep};
pub use error::{Error, Result, SignError};
pub use session::{
    CardService, CloseOutcome, RunReport, ServiceFault, SessionContext, SessionOrchestrator,
    SessionState, SubmitOutcome, SubmitResponse, SubmitResult,
};
pub use signer::{
    Algorithm, INVALID_TOKEN, ScenarioSigner, SignedScenario, SigningKey, SigningMaterial,
    TokenHeader,
};
