//! Derivation of independent random streams from a session seed.

use sha2::{Digest, Sha256};

/// Label of the stream driving wave planning.
pub const WAVE_STREAM: &str = "wave";
/// Label of the stream driving drop rolls.
pub const DROP_STREAM: &str = "drops";

/// Derives the seed of a labelled stream for one level of a session.
///
/// Equal inputs always give equal seeds; changing any input gives an
/// unrelated seed.
#[must_use]
pub fn derive_stream_seed(session_seed: u64, label: &str, level: u32) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(session_seed.to_le_bytes());
    hasher.update(label.as_bytes());
    hasher.update(level.to_le_bytes());
    finalize_seed(hasher)
}

fn finalize_seed(hasher: Sha256) -> u64 {
    let digest = hasher.finalize();
    let mut bytes = [0_u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}
