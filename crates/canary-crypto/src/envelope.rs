//! # Clear-Signed Envelope
//!
//! Armors a text message together with an Ed25519 signature so the message
//! stays human-readable:
//!
//! ```text
//! -----BEGIN CANARY SIGNED MESSAGE-----
//! Key: <64 hex public key>
//!
//! <message, lines starting with "-" escaped as "- -">
//! -----BEGIN CANARY SIGNATURE-----
//! <128 hex signature>
//! -----END CANARY SIGNATURE-----
//! ```
//!
//! The signature covers the unescaped message with `\r\n` line endings
//! normalised to `\n`, which is also what [`open`] returns. Opening fails closed:
//! any deviation from the layout is an error, and nothing after the end
//! line is tolerated except whitespace.

use crate::ed25519::{Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature};
use crate::error::CryptoError;

pub const BEGIN_MESSAGE: &str = "-----BEGIN CANARY SIGNED MESSAGE-----";
pub const BEGIN_SIGNATURE: &str = "-----BEGIN CANARY SIGNATURE-----";
pub const END_SIGNATURE: &str = "-----END CANARY SIGNATURE-----";
const KEY_HEADER: &str = "Key: ";

/// Sign `message` with `key` and wrap both in the envelope.
pub fn clear_sign(key: &Ed25519KeyPair, message: &str) -> String {
    let message = message
        .split('\n')
        .map(strip_cr)
        .collect::<Vec<_>>()
        .join("\n");
    let signature = key.sign(message.as_bytes());
    let mut out = String::with_capacity(message.len() + 400);
    out.push_str(BEGIN_MESSAGE);
    out.push('\n');
    out.push_str(KEY_HEADER);
    out.push_str(&key.public_key().to_hex());
    out.push_str("\n\n");
    for line in message.split('\n') {
        if line.starts_with('-') {
            out.push_str("- ");
        }
        out.push_str(line);
        out.push('\n');
    }
    out.push_str(BEGIN_SIGNATURE);
    out.push('\n');
    out.push_str(&signature.to_hex());
    out.push('\n');
    out.push_str(END_SIGNATURE);
    out.push('\n');
    out
}

/// Check the envelope against `trusted` and return the signed message.
pub fn open(trusted: &Ed25519PublicKey, armored: &str) -> Result<String, CryptoError> {
    let lines: Vec<&str> = armored
        .trim()
        .split('\n')
        .map(strip_cr)
        .collect();

    if lines.first() != Some(&BEGIN_MESSAGE) {
        return Err(CryptoError::MalformedArmor("missing begin line"));
    }
    let key_hex = lines
        .get(1)
        .and_then(|l| l.strip_prefix(KEY_HEADER))
        .ok_or(CryptoError::MalformedArmor("missing key header"))?;
    if lines.get(2) != Some(&"") {
        return Err(CryptoError::MalformedArmor("missing blank line after headers"));
    }

    let sig_at = lines
        .iter()
        .skip(3)
        .position(|l| *l == BEGIN_SIGNATURE)
        .map(|i| i + 3)
        .ok_or(CryptoError::MalformedArmor("missing signature block"))?;
    let sig_hex = lines
        .get(sig_at + 1)
        .ok_or(CryptoError::MalformedArmor("missing signature"))?;
    if lines.get(sig_at + 2) != Some(&END_SIGNATURE) {
        return Err(CryptoError::MalformedArmor("missing end line"));
    }
    if lines.len() != sig_at + 3 {
        return Err(CryptoError::MalformedArmor("trailing data after end line"));
    }

    let named = Ed25519PublicKey::from_hex(key_hex)?;
    if &named != trusted {
        return Err(CryptoError::KeyMismatch {
            expected: trusted.to_hex(),
            found: named.to_hex(),
        });
    }

    let mut body = Vec::with_capacity(sig_at - 3);
    for &line in &lines[3..sig_at] {
        if let Some(rest) = line.strip_prefix("- ") {
            body.push(rest);
        } else if line.starts_with('-') {
            return Err(CryptoError::MalformedArmor("unescaped dash line in message"));
        } else {
            body.push(line);
        }
    }
    let message = body.join("\n");

    let signature = Ed25519Signature::from_hex(sig_hex)?;
    trusted.verify(message.as_bytes(), &signature)?;
    Ok(message)
}

fn strip_cr(line: &str) -> &str {
    line.strip_suffix('\r').unwrap_or(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> Ed25519KeyPair {
        Ed25519KeyPair::from_seed(&[7u8; 32])
    }

    #[test]
    fn sign_then_open() {
        let kp = key();
        let msg = "We are fine.\n-----CANARY-----\n{\n  \"version\": 0\n}";
        let armored = clear_sign(&kp, msg);
        assert!(armored.contains("\n- -----CANARY-----\n"));
        assert_eq!(open(&kp.public_key(), &armored).unwrap(), msg);
    }

    #[test]
    fn empty_and_trailing_newline_messages_survive() {
        let kp = key();
        for msg in ["", "\n", "a\n", "- already escaped looking"] {
            let armored = clear_sign(&kp, msg);
            assert_eq!(open(&kp.public_key(), &armored).unwrap(), msg);
        }
    }

    #[test]
    fn crlf_transport_is_tolerated_on_armor() {
        let kp = key();
        let armored = clear_sign(&kp, "hello").replace('\n', "\r\n");
        assert_eq!(open(&kp.public_key(), &armored).unwrap(), "hello");
    }

    #[test]
    fn crlf_message_signs_its_lf_form() {
        let kp = key();
        let armored = clear_sign(&kp, "line one\r\nline two\r\n- dash\r\n");
        assert_eq!(
            open(&kp.public_key(), &armored).unwrap(),
            "line one\nline two\n- dash\n"
        );
    }

    #[test]
    fn tampered_message_fails() {
        let kp = key();
        let armored = clear_sign(&kp, "expiry soon").replace("soon", "never");
        assert!(matches!(
            open(&kp.public_key(), &armored),
            Err(CryptoError::VerificationFailed(_))
        ));
    }

    #[test]
    fn other_key_is_rejected() {
        let armored = clear_sign(&key(), "hello");
        let other = Ed25519KeyPair::from_seed(&[8u8; 32]).public_key();
        assert!(matches!(
            open(&other, &armored),
            Err(CryptoError::KeyMismatch { .. })
        ));
    }

    #[test]
    fn trailing_junk_is_rejected() {
        let kp = key();
        let armored = format!("{}extra\n", clear_sign(&kp, "hello"));
        assert_eq!(
            open(&kp.public_key(), &armored),
            Err(CryptoError::MalformedArmor("trailing data after end line"))
        );
    }

    #[test]
    fn junk_input_is_rejected() {
        let pk = key().public_key();
        assert!(open(&pk, "").is_err());
        assert!(open(&pk, "hello world").is_err());
        assert!(open(&pk, BEGIN_MESSAGE).is_err());
    }

    #[test]
    fn bad_signature_hex_is_rejected() {
        let kp = key();
        let armored = clear_sign(&kp, "hello");
        let sig_line = armored.lines().nth(4).unwrap().to_string();
        let broken = armored.replace(&sig_line, &"zz".repeat(64));
        assert!(matches!(
            open(&kp.public_key(), &broken),
            Err(CryptoError::VerificationFailed(_))
        ));
    }

    #[test]
    fn unescaped_dash_line_is_rejected() {
        let kp = key();
        let armored = clear_sign(&kp, "a").replace("\n\na\n", "\n\n-a\n");
        assert!(matches!(
            open(&kp.public_key(), &armored),
            Err(CryptoError::MalformedArmor(_))
        ));
    }
}
