//! 远程认证接口
//! 登录与令牌刷新

use crate::{
    auth::error::{error_message, AuthError, AuthResult},
    client::endpoint_url,
    config::ApiConfig,
    models::auth::{Credentials, RefreshRequest, RefreshedTokens, TokenPair},
};
use reqwest::Client;
use tracing::{debug, instrument, warn};
use url::Url;

#[derive(Debug, Clone)]
pub struct AuthApi {
    http: Client,
    login_url: Url,
    refresh_url: Url,
}

impl AuthApi {
    pub fn new(http: Client, config: &ApiConfig) -> AuthResult<Self> {
        Ok(Self {
            http,
            login_url: endpoint_url(&config.base_url, &config.login_path)?,
            refresh_url: endpoint_url(&config.base_url, &config.refresh_path)?,
        })
    }

    /// 用凭据换取令牌对
    #[instrument(skip_all, fields(email = %credentials.email))]
    pub async fn login(&self, credentials: &Credentials) -> AuthResult<TokenPair> {
        debug!(url = %self.login_url, "Attempting login");

        let response = self
            .http
            .post(self.login_url.clone())
            .json(&credentials.to_login_body())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = error_message(&body, || format!("Login failed (HTTP {})", status.as_u16()));
            warn!(status = %status, "Login rejected");
            return Err(AuthError::InvalidCredentials(message));
        }

        Ok(response.json::<TokenPair>().await?)
    }

    /// 用刷新令牌换取新的访问令牌
    #[instrument(skip_all)]
    pub async fn refresh(&self, refresh_token: &str) -> AuthResult<RefreshedTokens> {
        debug!(url = %self.refresh_url, "Refreshing access token");

        let response = self
            .http
            .post(self.refresh_url.clone())
            .json(&RefreshRequest {
                refresh: refresh_token,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message =
                error_message(&body, || format!("Token refresh failed (HTTP {})", status.as_u16()));
            warn!(status = %status, "Token refresh rejected");
            return Err(AuthError::TokenRefresh { status, message });
        }

        Ok(response.json::<RefreshedTokens>().await?)
    }
}
