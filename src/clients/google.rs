//! Google OIDC client: authorization URL, code exchange, userinfo lookup.

use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;

use crate::config::GoogleOAuthConfig;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Claims read from the OIDC userinfo endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleProfile {
    pub email: String,
    #[serde(default)]
    pub given_name: Option<String>,
    #[serde(default)]
    pub family_name: Option<String>,
    #[serde(default)]
    pub birthdate: Option<String>,
}

#[derive(Clone)]
pub struct GoogleOidcClient {
    client: Client,
    config: GoogleOAuthConfig,
}

impl GoogleOidcClient {
    pub fn new(config: GoogleOAuthConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .user_agent("Ricettario/1.0")
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {e}"))?;

        Ok(Self { client, config })
    }

    #[must_use]
    pub const fn with_shared_client(client: Client, config: GoogleOAuthConfig) -> Self {
        Self { client, config }
    }

    /// The URL the browser is redirected to for consent. The `state`
    /// value is verified again at the callback.
    #[must_use]
    pub fn authorize_url(&self, state: &str) -> String {
        format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&state={}",
            self.config.auth_url,
            urlencoding::encode(&self.config.client_id),
            urlencoding::encode(&self.config.redirect_uri),
            urlencoding::encode("openid email profile"),
            urlencoding::encode(state),
        )
    }

    /// Exchanges an authorization code for an access token.
    pub async fn exchange_code(&self, code: &str) -> Result<String> {
        let params = [
            ("code", code),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("grant_type", "authorization_code"),
        ];

        let response = self
            .client
            .post(&self.config.token_url)
            .form(&params)
            .send()
            .await
            .context("Token exchange request failed")?;

        if !response.status().is_success() {
            anyhow::bail!("Token endpoint returned {}", response.status());
        }

        let token: TokenResponse = response
            .json()
            .await
            .context("Failed to parse token response")?;

        Ok(token.access_token)
    }

    /// Fetches the userinfo claims for an access token.
    pub async fn fetch_profile(&self, access_token: &str) -> Result<GoogleProfile> {
        let response = self
            .client
            .get(&self.config.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await
            .context("Userinfo request failed")?;

        if !response.status().is_success() {
            anyhow::bail!("Userinfo endpoint returned {}", response.status());
        }

        let profile: GoogleProfile = response
            .json()
            .await
            .context("Failed to parse userinfo response")?;

        Ok(profile)
    }

    /// Full callback-side flow: code → token → profile.
    pub async fn login(&self, code: &str) -> Result<GoogleProfile> {
        let access_token = self.exchange_code(code).await?;
        self.fetch_profile(&access_token).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> GoogleOAuthConfig {
        GoogleOAuthConfig {
            enabled: true,
            client_id: "client-123".to_string(),
            client_secret: "secret".to_string(),
            redirect_uri: "http://localhost:6780/api/auth/google/callback".to_string(),
            auth_url: "https://accounts.google.com/o/oauth2/v2/auth".to_string(),
            token_url: "https://oauth2.googleapis.com/token".to_string(),
            userinfo_url: "https://openidconnect.googleapis.com/v1/userinfo".to_string(),
        }
    }

    #[test]
    fn test_authorize_url_encodes_params() {
        let client = GoogleOidcClient::new(test_config()).unwrap();
        let url = client.authorize_url("st ate");

        assert!(url.starts_with("https://accounts.google.com/o/oauth2/v2/auth?"));
        assert!(url.contains("client_id=client-123"));
        assert!(url.contains("scope=openid%20email%20profile"));
        assert!(url.contains("state=st%20ate"));
        assert!(url.contains(
            "redirect_uri=http%3A%2F%2Flocalhost%3A6780%2Fapi%2Fauth%2Fgoogle%2Fcallback"
        ));
    }
}
