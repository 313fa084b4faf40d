//! Firebase identity-toolkit credential verification
//!
//! https://firebase.google.com/docs/reference/rest/auth#section-get-account-info

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::{IdentityVerifier, VerifiedUser};

pub const IDENTITY_API_BASE: &str = "https://identitytoolkit.googleapis.com";

#[derive(Debug, Clone)]
pub struct FirebaseVerifier {
    client: reqwest::Client,
    api_key: String,
    api_base: String,
}

impl FirebaseVerifier {
    pub fn new(api_key: impl Into<String>, api_base: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_env(api_base: impl Into<String>) -> Result<Self> {
        let api_key = std::env::var("ARCANA_FIREBASE_API_KEY")
            .map_err(|_| anyhow!("ARCANA_FIREBASE_API_KEY is not set"))?;
        Ok(Self::new(api_key, api_base))
    }

    async fn lookup(&self, id_token: &str) -> Result<VerifiedUser> {
        let url = format!(
            "{}/v1/accounts:lookup?key={}",
            self.api_base, self.api_key
        );
        let resp = self
            .client
            .post(&url)
            .header("content-type", "application/json")
            .json(&LookupRequest {
                id_token: id_token.into(),
            })
            .send()
            .await?;

        let status = resp.status();
        if status != StatusCode::OK {
            let text = resp.text().await?;
            return Err(anyhow!("identity api error ({status}): {text}"));
        }

        let body: LookupResponse = resp.json().await?;
        let user = body
            .users
            .first()
            .ok_or_else(|| anyhow!("identity api error: no matching account"))?;

        Ok(VerifiedUser {
            subject_id: user.local_id.clone(),
        })
    }
}

#[async_trait]
impl IdentityVerifier for FirebaseVerifier {
    async fn verify(&self, credential: &str) -> Option<VerifiedUser> {
        if credential.trim().is_empty() {
            return None;
        }
        match self.lookup(credential).await {
            Ok(user) => Some(user),
            Err(e) => {
                tracing::warn!("credential verification failed: {e}");
                None
            }
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct LookupRequest {
    id_token: String,
}

#[derive(Debug, Clone, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<AccountInfo>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountInfo {
    local_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_response_deserialization() {
        let raw = serde_json::json!({
            "kind": "identitytoolkit#GetAccountInfoResponse",
            "users": [{"localId": "uid-123", "email": "seeker@example.com"}]
        });
        let parsed: LookupResponse = serde_json::from_value(raw).unwrap();
        assert_eq!(parsed.users[0].local_id, "uid-123");
    }

    #[test]
    fn lookup_response_tolerates_missing_users() {
        let parsed: LookupResponse = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(parsed.users.is_empty());
    }
}
