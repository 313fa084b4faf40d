pub mod firebase;

pub use firebase::FirebaseVerifier;

use async_trait::async_trait;

/// Identity record for a verified caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedUser {
    pub subject_id: String,
}

/// Validates an inbound session credential. `None` is a definitive
/// rejection: the caller must abort and route to re-authentication, not
/// retry. Transport and parse faults also verify as rejected (fail-closed).
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, credential: &str) -> Option<VerifiedUser>;
}
