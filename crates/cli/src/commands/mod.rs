use std::path::PathBuf;

use clap::Subcommand;

use crate::utils::ApduSource;

mod extract;
mod scenario;
mod send;
mod sign;

pub(crate) use extract::extract_command;
pub(crate) use scenario::scenario_command;
pub(crate) use send::send_command;
pub(crate) use sign::sign_command;

/// Define subcommands for the CLI
#[derive(Subcommand)]
pub(crate) enum Commands {
    /// List the APDUs found in a capture file
    Extract {
        /// Capture file to read
        #[arg(required = true)]
        capture: PathBuf,

        /// Include APDUs whose instruction is not in the table
        #[arg(long)]
        all: bool,

        /// Print every decoded field and the full hex
        #[arg(short, long)]
        detailed: bool,
    },

    /// Print the scenario document built from the APDUs
    Scenario {
        #[command(flatten)]
        source: ApduSource,

        /// Session id written into the document (default: configured card handle)
        #[arg(long)]
        session_id: Option<String>,
    },

    /// Print the signed scenario token
    Sign {
        #[command(flatten)]
        source: ApduSource,

        /// Session id written into the document (default: configured card handle)
        #[arg(long)]
        session_id: Option<String>,
    },

    /// Open a session, submit the scenario and close the session
    Send {
        #[command(flatten)]
        source: ApduSource,

        /// Card handle to open the session on (default: configured card handle)
        #[arg(long)]
        card_handle: Option<String>,

        /// Log the service calls instead of contacting a card service
        #[arg(long)]
        dry_run: bool,
    },
}
