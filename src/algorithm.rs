//! Hash algorithm selection and the keyed digest primitives built on it.

use digest::{KeyInit, Mac};
use hmac::Hmac;
use sha1::Sha1;
use sha2::{Sha256, Sha384, Sha512};
use subtle::ConstantTimeEq;

/// The hash function backing HMAC computation and key derivation.
///
/// Chosen once when a signer is constructed. Each variant carries its digest
/// and block sizes; the HMAC block size doubles as the derived key length so
/// the signing key exactly fills one block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Algorithm {
    /// HMAC-SHA1. The hash is broken for collisions, but HMAC-SHA1 remains
    /// unbroken as a MAC; kept for interoperability with existing tokens.
    Sha1,
    /// HMAC-SHA256, the default.
    #[default]
    Sha256,
    /// HMAC-SHA384.
    Sha384,
    /// HMAC-SHA512.
    Sha512,
}

impl Algorithm {
    /// Digest output size in bits.
    pub const fn digest_bits(self) -> usize {
        self.digest_len() * 8
    }

    /// Digest output size in bytes.
    pub const fn digest_len(self) -> usize {
        match self {
            Algorithm::Sha1 => 20,
            Algorithm::Sha256 => 32,
            Algorithm::Sha384 => 48,
            Algorithm::Sha512 => 64,
        }
    }

    /// Internal block size of the hash in bytes.
    ///
    /// Keys shorter than a block get zero-padded by HMAC, keys longer get
    /// hashed down; deriving exactly this many bytes avoids both.
    pub const fn block_len(self) -> usize {
        match self {
            Algorithm::Sha1 | Algorithm::Sha256 => 64,
            Algorithm::Sha384 | Algorithm::Sha512 => 128,
        }
    }

    /// Compute the keyed MAC of `data` under `key`.
    pub fn hmac(self, key: &[u8], data: &[u8]) -> Vec<u8> {
        match self {
            Algorithm::Sha1 => mac_with::<Hmac<Sha1>>(key, data),
            Algorithm::Sha256 => mac_with::<Hmac<Sha256>>(key, data),
            Algorithm::Sha384 => mac_with::<Hmac<Sha384>>(key, data),
            Algorithm::Sha512 => mac_with::<Hmac<Sha512>>(key, data),
        }
    }
}

fn mac_with<M: Mac + KeyInit>(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac = <M as Mac>::new_from_slice(key).expect("hmac accepts keys of any length");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

/// Compare two digests without leaking where they differ.
///
/// Mismatched lengths return `false` straight away; equal-length inputs are
/// always compared in full, so the running time is independent of the position
/// of the first differing byte.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.ct_eq(b).into()
}
