//! Capture inspection

use std::path::Path;

use sicct_capture::ApduExtractor;
use tracing::info;

use crate::utils::display::{key_value_box, record_detail, record_line, section_title, warning};

/// Print the APDUs of a capture
pub(crate) fn extract_command(capture: &Path, all: bool, detailed: bool) -> eyre::Result<()> {
    let extraction = ApduExtractor::new().extract_file(capture)?;
    let summary = extraction.summary();
    info!(path = %capture.display(), apdus = summary.apdus, "Capture decoded");

    let records: Vec<_> = if all {
        extraction.records().iter().collect()
    } else {
        extraction.known_instructions().collect()
    };

    println!(
        "{}",
        key_value_box(
            "Capture",
            vec![
                ("File", capture.display().to_string()),
                ("Packets", summary.packets.to_string()),
                ("Candidates", summary.candidates.to_string()),
                ("APDUs", summary.apdus.to_string()),
                ("Shown", records.len().to_string()),
            ],
        )
    );

    if records.is_empty() {
        println!("{}", warning("No APDUs found"));
        return Ok(());
    }

    println!("{}", section_title("APDUs"));
    for (index, record) in records.iter().enumerate() {
        println!("{}", record_line(index, record));
        if detailed {
            println!("{}\n", record_detail(record));
        }
    }

    Ok(())
}
