use sha2::{Digest, Sha256};

/// Number of hex characters kept from the digest.
const SESSION_ID_LEN: usize = 12;

/// Derive a stable short session identifier from a transcript path.
///
/// The path is hashed as given (no canonicalization), so the same string
/// always maps to the same identifier.
pub fn session_id(transcript_path: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(transcript_path.as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    digest[..SESSION_ID_LEN].to_string()
}
