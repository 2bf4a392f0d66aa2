//! # Proof Message Layout
//!
//! The text that gets signed: an optional human-readable description, the
//! separator line, then the pretty-printed canary JSON.
//!
//! ```text
//! We are fine.
//! -----CANARY-----
//! {
//!   "version": 0,
//!   ...
//! }
//! ```

use crate::canary::Canary;
use crate::error::DocumentError;

/// Line separating the description from the canary JSON.
pub const CANARY_SEPARATOR: &str = "-----CANARY-----";

/// Lay out a description and a canary as a message ready for signing.
pub fn compose_message(description: &str, canary: &Canary) -> Result<String, DocumentError> {
    let json = canary.to_json_pretty()?;
    if description.is_empty() {
        Ok(format!("{CANARY_SEPARATOR}\n{json}"))
    } else {
        Ok(format!("{description}\n{CANARY_SEPARATOR}\n{json}"))
    }
}

/// Split a verified message back into its canary and description.
///
/// The first line equal to the separator (ignoring a trailing `\r`) ends
/// the description; blank lines after it are skipped and the rest is
/// parsed as JSON.
pub fn parse_message(message: &str) -> Result<(Canary, String), DocumentError> {
    let lines: Vec<&str> = message.split('\n').collect();
    let sep = lines
        .iter()
        .position(|l| l.trim_end_matches('\r') == CANARY_SEPARATOR)
        .ok_or(DocumentError::MissingSeparator)?;

    let description = lines[..sep].join("\n");
    let body_start = lines[sep + 1..]
        .iter()
        .position(|l| !l.trim_end_matches('\r').is_empty())
        .map_or(lines.len(), |offset| sep + 1 + offset);
    let body = lines[body_start..].join("\n");

    let canary = Canary::from_json(&body)?;
    Ok((canary, description))
}
