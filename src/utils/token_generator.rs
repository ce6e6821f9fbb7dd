//! Bearer token generation and shape validation.

use base64::Engine as _;

/// Random bytes per token before encoding.
const TOKEN_LENGTH_BYTES: usize = 18;

/// Length of an encoded token (18 bytes of URL-safe base64, no padding).
pub const TOKEN_LENGTH: usize = 24;

/// Generates a cryptographically secure random token.
///
/// Uses `getrandom` for entropy and encodes the result as URL-safe base64
/// without padding, producing a 24-character token.
///
/// # Errors
///
/// Returns an error if the system random number generator fails.
pub fn generate_token() -> Result<String, getrandom::Error> {
    let mut buffer = [0u8; TOKEN_LENGTH_BYTES];

    getrandom::fill(&mut buffer)?;

    Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(buffer))
}

/// Checks the shape of a presented token before any store lookup.
///
/// A token must be non-empty, exactly [`TOKEN_LENGTH`] bytes long, and use
/// only the URL-safe base64 alphabet.
pub fn is_well_formed(token: &str) -> bool {
    !token.is_empty()
        && token.len() == TOKEN_LENGTH
        && token
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}
