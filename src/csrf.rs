use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::Rng;

/// Number of random bytes behind each state token (256 bits).
pub const STATE_BYTES: usize = 32;

/// Generates a cryptographically random, single-use `OAuth2` state token.
///
/// Returns a 43-character URL-safe string (32 random bytes → base64url).
/// Bytes come from the thread-local CSPRNG seeded by the OS; if the OS source
/// is unavailable this panics, since no further tokens can be issued safely.
#[must_use]
pub fn generate_state() -> String {
    let random_bytes: [u8; STATE_BYTES] = rand::rng().random();
    URL_SAFE_NO_PAD.encode(random_bytes)
}
