//! Typed access to verified structured payloads.

use serde::de::DeserializeOwned;
use serde::Deserialize as _;
use serde_json::Value;

/// A verified JSON payload with lenient, typed field access.
///
/// Lookups never fail: a key that is absent, `null`, or of an incompatible
/// type yields `None` (or the caller's fallback). This is deliberately the one
/// lenient surface of an otherwise strict format — optional claims can be read
/// without error handling at every call site.
///
/// ```
/// use macaron_tokens::Signer;
///
/// let signer = Signer::new("secretkey").unwrap();
/// let token = signer.sign_json(&serde_json::json!({ "user": "ferris" })).unwrap();
///
/// let payload = signer.verify_json(&token).unwrap();
/// assert_eq!(payload.get::<String>("user").as_deref(), Some("ferris"));
/// assert_eq!(payload.get_or("retries", 3), 3);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct JsonPayload {
    value: Value,
}

impl JsonPayload {
    pub(crate) fn new(value: Value) -> Self {
        Self { value }
    }

    /// The raw document.
    pub fn as_value(&self) -> &Value {
        &self.value
    }

    /// Deserialize the whole document, for payloads without keys such as
    /// arrays. `None` if the document does not fit `T`.
    pub fn root<T: DeserializeOwned>(&self) -> Option<T> {
        T::deserialize(&self.value).ok()
    }

    /// Look up `key`, returning `None` when it is absent, `null`, or not a `T`.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.value.get(key) {
            None | Some(Value::Null) => None,
            Some(field) => T::deserialize(field).ok(),
        }
    }

    /// Look up `key`, substituting `fallback` when it is absent, `null`, or
    /// not a `T`.
    pub fn get_or<T: DeserializeOwned>(&self, key: &str, fallback: T) -> T {
        self.get(key).unwrap_or(fallback)
    }
}

impl From<JsonPayload> for Value {
    fn from(payload: JsonPayload) -> Self {
        payload.value
    }
}
