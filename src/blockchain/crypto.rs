use sha2::{Digest, Sha256};

/// Length of a hex-encoded SHA-256 digest
pub const HASH_HEX_LEN: usize = 64;

/// Hashes a sequence of byte slices as if they were one concatenated buffer
///
/// # Arguments
///
/// * `parts` - The pieces to feed into the hasher, in order, with no separator
///
/// # Returns
///
/// The SHA-256 digest as a lowercase hexadecimal string
pub fn sha256_hex<I, T>(parts: I) -> String
where
    I: IntoIterator<Item = T>,
    T: AsRef<[u8]>,
{
    let mut hasher = Sha256::new();

    for part in parts {
        hasher.update(part.as_ref());
    }

    hex::encode(hasher.finalize())
}

/// Checks that a string looks like a hex-encoded SHA-256 digest
pub fn is_hash_hex(value: &str) -> bool {
    value.len() == HASH_HEX_LEN && value.bytes().all(|b| b.is_ascii_hexdigit())
}
