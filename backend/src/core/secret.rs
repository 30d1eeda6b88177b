//! Process-wide HMAC secret for the Decision Ledger (spec §4.2, §6).
//!
//! Spec §6 ("Environment") specifies that a process secret for HMAC signing
//! is read at startup and that a rotation policy is assumed but not
//! implemented by the core — so this type is deliberately a thin, immutable
//! holder, not a key-management service.

/// The HMAC key used to sign and verify Decision Ledger entries.
///
/// Cloning is cheap (`Arc` internally would be the production choice if this
/// needs to be shared across threads; the core keeps it a plain byte buffer
/// since thread ownership is the embedding application's concern).
#[derive(Clone)]
pub struct ProcessSecret(Vec<u8>);

impl ProcessSecret {
    /// Build a secret from raw bytes (e.g. read from the environment at
    /// process startup).
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Debug for ProcessSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ProcessSecret").field(&"<redacted>").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_does_not_leak_bytes() {
        let secret = ProcessSecret::from_bytes(b"super-secret".to_vec());
        assert!(!format!("{:?}", secret).contains("super-secret"));
    }
}
