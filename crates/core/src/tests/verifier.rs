use crate::access::{Principal, TokenVerifier, VerifyError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Verifier backed by a fixed credential table
#[derive(Clone, Default)]
pub struct StaticTokenVerifier {
    principals: HashMap<String, Principal>,
    calls: Arc<AtomicUsize>,
}

impl StaticTokenVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_principal(mut self, credential: impl Into<String>, principal: Principal) -> Self {
        self.principals.insert(credential.into(), principal);
        self
    }

    /// Number of `verify` calls made so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenVerifier for StaticTokenVerifier {
    async fn verify(&self, credential: &str) -> Result<Principal, VerifyError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match credential {
            "expired" => Err(VerifyError::Expired),
            _ => self
                .principals
                .get(credential)
                .cloned()
                .ok_or_else(|| VerifyError::Invalid("unknown credential".to_string())),
        }
    }
}
