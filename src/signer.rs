//! The untimed token codec: `payload.signature`.

use std::fmt;
use std::marker::PhantomData;

use serde::Serialize;

use crate::algorithm::{constant_time_eq, Algorithm};
use crate::encoding::{Encoding, Standard, UrlSafe};
use crate::payload::JsonPayload;
use crate::{hkdf, BadToken, ConfigError};

/// Salt applied to key derivation when the caller does not provide one.
pub const DEFAULT_SALT: &[u8] = b"default.salt";

/// Separator between token segments unless overridden.
pub const DEFAULT_SEPARATOR: &str = ".";

/// Signs payloads into compact `payload.signature` tokens and verifies them.
///
/// The payload is base64-framed and bound to an HMAC whose key is freshly
/// derived (HKDF) from the configured secret, salt and context info on every
/// call. Configuration is fixed at construction, so a signer can be shared
/// freely across threads.
///
/// ```
/// use macaron_tokens::{Algorithm, Signer};
///
/// let signer = Signer::new("super secret signing key")?
///     .with_salt("sessions-v2")
///     .with_algorithm(Algorithm::Sha256);
///
/// let token = signer.sign("user-4028");
/// assert_eq!(signer.verify_text(&token)?, "user-4028");
/// # Ok::<_, Box<dyn std::error::Error>>(())
/// ```
///
/// The type parameter selects the base64 alphabet; see [`UrlSafeSigner`] for
/// tokens that must survive URLs unescaped.
#[derive(Clone)]
pub struct Signer<E = Standard> {
    pub(crate) key: Vec<u8>,
    pub(crate) salt: Vec<u8>,
    pub(crate) info: Vec<u8>,
    pub(crate) algorithm: Algorithm,
    pub(crate) sep: String,
    pub(crate) _encoding: PhantomData<E>,
}

/// A [`Signer`] using the URL-safe base64 alphabet.
pub type UrlSafeSigner = Signer<UrlSafe>;

impl Signer<Standard> {
    /// Create a signer with the default salt, empty context info, the default
    /// algorithm, a `.` separator and the standard base64 alphabet.
    ///
    /// Fails with [`ConfigError::EmptyKey`] for an empty key; there is no
    /// usable signer without a secret.
    pub fn new(key: impl Into<Vec<u8>>) -> Result<Self, ConfigError> {
        Self::with_encoding(key)
    }
}

impl Signer<UrlSafe> {
    /// Create a signer using the URL-safe base64 alphabet; otherwise as
    /// [`Signer::new`].
    pub fn new_url_safe(key: impl Into<Vec<u8>>) -> Result<Self, ConfigError> {
        Self::with_encoding(key)
    }
}

impl<E: Encoding> Signer<E> {
    /// Create a signer with an explicit encoding strategy, for callers that
    /// bring their own [`Encoding`].
    ///
    /// [`Signer::new`] and [`Signer::new_url_safe`] pick the strategy for the
    /// two built-in alphabets.
    pub fn with_encoding(key: impl Into<Vec<u8>>) -> Result<Self, ConfigError> {
        let key = key.into();
        if key.is_empty() {
            return Err(ConfigError::EmptyKey);
        }
        Ok(Self {
            key,
            salt: DEFAULT_SALT.to_vec(),
            info: Vec::new(),
            algorithm: Algorithm::default(),
            sep: DEFAULT_SEPARATOR.to_owned(),
            _encoding: PhantomData,
        })
    }

    /// Replace the key-derivation salt.
    pub fn with_salt(mut self, salt: impl Into<Vec<u8>>) -> Self {
        self.salt = salt.into();
        self
    }

    /// Bind the derived key to application-specific context bytes.
    ///
    /// Two signers with the same key but different info derive unrelated
    /// signing keys, so tokens cannot be replayed across contexts.
    pub fn with_info(mut self, info: impl Into<Vec<u8>>) -> Self {
        self.info = info.into();
        self
    }

    /// Select the hash algorithm.
    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Replace the segment separator.
    ///
    /// Fails if the separator is empty or shares characters with the base64
    /// alphabet, either of which would make tokens ambiguous to split.
    pub fn with_separator(mut self, sep: impl Into<String>) -> Result<Self, ConfigError> {
        let sep = sep.into();
        if sep.is_empty() {
            return Err(ConfigError::EmptySeparator);
        }
        if E::contains_reserved_chars(&sep) {
            return Err(ConfigError::ReservedSeparator);
        }
        self.sep = sep;
        Ok(self)
    }

    /// The configured hash algorithm.
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// The configured segment separator.
    pub fn separator(&self) -> &str {
        &self.sep
    }

    /// Sign a text payload.
    pub fn sign(&self, payload: &str) -> String {
        self.sign_bytes(payload.as_bytes())
    }

    /// Sign raw payload bytes.
    pub fn sign_bytes(&self, payload: &[u8]) -> String {
        let encoded = E::encode(payload);
        let signature = E::encode(&self.signature_of(encoded.as_bytes()));
        format!("{encoded}{sep}{signature}", sep = self.sep)
    }

    /// Serialize `payload` as JSON and sign the bytes.
    pub fn sign_json<T: Serialize>(&self, payload: &T) -> Result<String, serde_json::Error> {
        Ok(self.sign_bytes(&serde_json::to_vec(payload)?))
    }

    /// Verify a token and return the payload bytes.
    ///
    /// The signature is recomputed over the payload segment's literal text and
    /// compared in constant time; only after it matches is the payload
    /// decoded, so a tampered payload is reported as
    /// [`BadToken::SignatureMismatch`] rather than a decode failure.
    pub fn verify(&self, token: &str) -> Result<Vec<u8>, BadToken> {
        let (encoded, signature) = self.split(token)?;
        let mac = self.signature_of(encoded.as_bytes());
        if !constant_time_eq(&mac, &signature) {
            return Err(BadToken::SignatureMismatch);
        }
        E::decode(encoded).map_err(|_| BadToken::Malformed)
    }

    /// Verify a token and return the payload as text.
    pub fn verify_text(&self, token: &str) -> Result<String, BadToken> {
        String::from_utf8(self.verify(token)?).map_err(|_| BadToken::InvalidPayload)
    }

    /// Verify a token and parse the payload as JSON.
    pub fn verify_json(&self, token: &str) -> Result<JsonPayload, BadToken> {
        let bytes = self.verify(token)?;
        let value = serde_json::from_slice(&bytes).map_err(|_| BadToken::InvalidPayload)?;
        Ok(JsonPayload::new(value))
    }

    /// Derive the signing key for this call.
    ///
    /// Recomputed on every sign/verify so derived key material is never held
    /// longer than the call. The output fills exactly one HMAC block.
    pub(crate) fn derive_key(&self) -> Vec<u8> {
        let prk = hkdf::extract(self.algorithm, &self.salt, &self.key);
        hkdf::expand(self.algorithm, &prk, &self.info, self.algorithm.block_len())
            .expect("one hmac block is within the rfc 5869 expansion limit")
    }

    pub(crate) fn signature_of(&self, data: &[u8]) -> Vec<u8> {
        self.algorithm.hmac(&self.derive_key(), data)
    }

    fn split<'t>(&self, token: &'t str) -> Result<(&'t str, Vec<u8>), BadToken> {
        let mut segments = token.split(self.sep.as_str());
        let (Some(encoded), Some(signature), None) =
            (segments.next(), segments.next(), segments.next())
        else {
            return Err(BadToken::Malformed);
        };
        let signature = E::decode(signature).map_err(|_| BadToken::Malformed)?;
        Ok((encoded, signature))
    }
}

impl<E> fmt::Debug for Signer<E> {
    // key material stays out of logs
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signer")
            .field("algorithm", &self.algorithm)
            .field("sep", &self.sep)
            .finish_non_exhaustive()
    }
}
