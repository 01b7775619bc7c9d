#![deny(unsafe_code)]

use sha2::Digest;

/// Lower-case hex SHA-256 of `bytes`, the form pinned in `manifest.toml`.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let digest = sha2::Sha256::digest(bytes);
    hex::encode(digest)
}

/// Whether `value` has the shape of a pinned digest (64 hex characters).
pub fn is_sha256_hex(value: &str) -> bool {
    value.len() == 64 && value.chars().all(|c| c.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_of_empty_input() {
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert!(is_sha256_hex(&sha256_hex(b"A|versao|")));
        assert!(!is_sha256_hex("abc"));
    }
}
