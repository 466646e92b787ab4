//! Validators for values clients ask to track.
//!
//! These decide whether a `track-tx` or `track-address` value is accepted.
//! A rejected value is not an error; the session simply clears the field.

use std::sync::LazyLock;

use regex::Regex;

/// Length of a transaction id in hex characters.
pub const TXID_LENGTH: usize = 64;

/// Segwit address: human-readable part, separator `1`, bech32 data part.
static BECH32_ADDRESS: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"^[a-z]{2,5}1[ac-hj-np-z02-9]{8,87}$"));

/// Returns true if `candidate` is exactly 64 hexadecimal characters.
#[must_use]
pub fn is_txid(candidate: &str) -> bool {
    candidate.len() == TXID_LENGTH && candidate.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Returns true if `candidate` has one of the accepted address forms.
///
/// Accepted forms:
///
/// - legacy base58, 26 to 35 characters
/// - base58 script form, exactly 80 characters
/// - bech32 segwit address, lowercase
#[must_use]
pub fn is_address(candidate: &str) -> bool {
    is_base58_address(candidate) || is_bech32_address(candidate)
}

fn is_base58_address(candidate: &str) -> bool {
    matches!(candidate.len(), 26..=35 | 80) && bs58::decode(candidate).into_vec().is_ok()
}

fn is_bech32_address(candidate: &str) -> bool {
    BECH32_ADDRESS
        .as_ref()
        .is_ok_and(|pattern| pattern.is_match(candidate))
}
