use applicant::{AuthError, Identity, IdentityProvider};
use async_trait::async_trait;
use reqwest::Response;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, warn};

use super::RestBackend;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountResponse {
    local_id: String,
    email: String,
    id_token: String,
    refresh_token: String,
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    id_token: String,
    refresh_token: String,
    user_id: String,
}

/// Map the provider's error code (`{"error": {"message": "EMAIL_EXISTS"}}`).
///
/// Some codes carry a human suffix (`WEAK_PASSWORD : Password should be ...`).
pub(crate) fn auth_error(body: &Value) -> AuthError {
    let message = body["error"]["message"].as_str().unwrap_or_default();
    let code = message
        .split([' ', ':'])
        .next()
        .unwrap_or_default();
    match code {
        "EMAIL_EXISTS" => AuthError::EmailInUse,
        "WEAK_PASSWORD" => AuthError::WeakPassword,
        "EMAIL_NOT_FOUND" | "USER_NOT_FOUND" => AuthError::NotFound,
        "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" => AuthError::WrongPassword,
        "INVALID_EMAIL" | "MISSING_EMAIL" => AuthError::InvalidEmail,
        "" => AuthError::Unknown("empty error response".into()),
        other => AuthError::Unknown(other.to_string()),
    }
}

fn transport(err: reqwest::Error) -> AuthError {
    AuthError::Network(err.to_string())
}

async fn decode<T: for<'de> Deserialize<'de>>(response: Response) -> Result<T, AuthError> {
    let status = response.status();
    let body: Value = response.json().await.map_err(transport)?;
    if !status.is_success() {
        let err = auth_error(&body);
        debug!(%status, error = %err, "identity call rejected");
        return Err(err);
    }
    serde_json::from_value(body).map_err(|err| AuthError::Unknown(err.to_string()))
}

impl RestBackend {
    async fn account_call(
        &self,
        method: &str,
        email: &str,
        password: &str,
    ) -> Result<Identity, AuthError> {
        let url = format!("{}/accounts:{method}", self.identity_endpoint);
        let payload = json!({
            "email": email,
            "password": password,
            "returnSecureToken": true,
        });

        let response = self
            .http
            .post(url)
            .query(&[("key", self.api_key.as_str())])
            .json(&payload)
            .send()
            .await
            .map_err(|err| {
                warn!(method, error = %err, "identity provider unreachable");
                transport(err)
            })?;
        let account: AccountResponse = decode(response).await?;

        self.set_token(Some(account.id_token.clone())).await;
        Ok(Identity {
            uid: account.local_id,
            email: account.email,
            token: Some(account.id_token),
            refresh_token: Some(account.refresh_token),
        })
    }
}

#[async_trait]
impl IdentityProvider for RestBackend {
    async fn sign_up(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        self.account_call("signUp", email, password).await
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        self.account_call("signInWithPassword", email, password).await
    }

    async fn sign_out(&self, _identity: &Identity) -> Result<(), AuthError> {
        self.set_token(None).await;
        Ok(())
    }

    /// Exchange the refresh token for a fresh id token.
    async fn resume(&self, identity: Identity) -> Result<Identity, AuthError> {
        let Some(refresh_token) = identity.refresh_token.as_deref() else {
            self.set_token(identity.token.clone()).await;
            return Ok(identity);
        };

        let url = format!("{}/token", self.token_endpoint);
        let payload = json!({
            "grant_type": "refresh_token",
            "refresh_token": refresh_token,
        });
        let response = self
            .http
            .post(url)
            .query(&[("key", self.api_key.as_str())])
            .json(&payload)
            .send()
            .await
            .map_err(transport)?;
        let refreshed: RefreshResponse = decode(response).await?;
        if refreshed.user_id != identity.uid {
            return Err(AuthError::Unknown("refresh token belongs to another user".into()));
        }

        self.set_token(Some(refreshed.id_token.clone())).await;
        Ok(Identity {
            token: Some(refreshed.id_token),
            refresh_token: Some(refreshed.refresh_token),
            ..identity
        })
    }
}
