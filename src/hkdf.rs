//! HMAC-based key derivation, RFC 5869.
//!
//! Extract-then-expand: [`extract`] concentrates the caller's keying material
//! into a pseudorandom key, [`expand`] stretches it to the requested length
//! while binding it to context `info` bytes. The signers use this to stretch
//! the secret key to the HMAC block size of the chosen algorithm, so the
//! signing key never gets zero-padded or hashed down by HMAC itself.

use crate::algorithm::Algorithm;

/// Rejected key-derivation input.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum KdfError {
    /// The input keying material was empty.
    #[error("input keying material must not be empty")]
    InvalidKeyMaterial,
    /// The requested output length was zero.
    #[error("output length must be at least one byte")]
    InvalidLength,
    /// RFC 5869 caps the output at 255 digest lengths.
    #[error("output length must not exceed 255 digest lengths")]
    LengthTooLarge,
}

/// Concentrate `ikm` into a pseudorandom key: `prk = HMAC(salt, ikm)`.
///
/// An empty `salt` is replaced by a zero-filled buffer of one digest length,
/// per RFC 5869 §2.2.
pub fn extract(algorithm: Algorithm, salt: &[u8], ikm: &[u8]) -> Vec<u8> {
    if salt.is_empty() {
        algorithm.hmac(&vec![0; algorithm.digest_len()], ikm)
    } else {
        algorithm.hmac(salt, ikm)
    }
}

/// Stretch `prk` to `length` bytes of output keying material.
///
/// Each round chains the previous block: `t_i = HMAC(prk, t_{i-1} ‖ info ‖ i)`
/// with `t_0` empty and `i` a single byte counting from 1. The concatenated
/// blocks are truncated to `length`.
pub fn expand(
    algorithm: Algorithm,
    prk: &[u8],
    info: &[u8],
    length: usize,
) -> Result<Vec<u8>, KdfError> {
    let digest_len = algorithm.digest_len();
    let rounds = (length + digest_len - 1) / digest_len;
    if rounds > 255 {
        return Err(KdfError::LengthTooLarge);
    }

    let mut okm = Vec::with_capacity(rounds * digest_len);
    let mut t = Vec::new();
    for i in 1..=rounds {
        let mut block = Vec::with_capacity(t.len() + info.len() + 1);
        block.extend_from_slice(&t);
        block.extend_from_slice(info);
        block.push(i as u8);
        t = algorithm.hmac(prk, &block);
        okm.extend_from_slice(&t);
    }
    okm.truncate(length);
    Ok(okm)
}

/// Derive `length` bytes of keying material from `ikm`.
///
/// `salt` and `info` may be empty; an empty salt is substituted with zeroes in
/// [`extract`] and an empty `info` simply binds no context.
pub fn derive_key(
    algorithm: Algorithm,
    ikm: &[u8],
    length: usize,
    salt: &[u8],
    info: &[u8],
) -> Result<Vec<u8>, KdfError> {
    if ikm.is_empty() {
        return Err(KdfError::InvalidKeyMaterial);
    }
    if length == 0 {
        return Err(KdfError::InvalidLength);
    }
    if length > 255 * algorithm.digest_len() {
        return Err(KdfError::LengthTooLarge);
    }

    expand(algorithm, &extract(algorithm, salt, ikm), info, length)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_keying_material() {
        let err = derive_key(Algorithm::Sha256, b"", 32, b"salt", b"").unwrap_err();
        assert_eq!(err, KdfError::InvalidKeyMaterial);
    }

    #[test]
    fn rejects_zero_length() {
        let err = derive_key(Algorithm::Sha256, b"key", 0, b"", b"").unwrap_err();
        assert_eq!(err, KdfError::InvalidLength);
    }

    #[test]
    fn rejects_oversized_length() {
        for algorithm in [Algorithm::Sha1, Algorithm::Sha512] {
            let limit = 255 * algorithm.digest_len();
            assert!(derive_key(algorithm, b"key", limit, b"", b"").is_ok());
            let err = derive_key(algorithm, b"key", limit + 1, b"", b"").unwrap_err();
            assert_eq!(err, KdfError::LengthTooLarge);
        }
    }

    #[test]
    fn truncates_to_the_requested_length() {
        let long = derive_key(Algorithm::Sha256, b"key", 64, b"salt", b"info").unwrap();
        let short = derive_key(Algorithm::Sha256, b"key", 21, b"salt", b"info").unwrap();
        assert_eq!(short.len(), 21);
        assert_eq!(long[..21], short[..]);
    }

    #[test]
    fn empty_salt_matches_zero_filled_salt() {
        let implicit = derive_key(Algorithm::Sha384, b"key", 48, b"", b"").unwrap();
        let explicit = derive_key(Algorithm::Sha384, b"key", 48, &[0u8; 48], b"").unwrap();
        assert_eq!(implicit, explicit);
    }
}
