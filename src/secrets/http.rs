//! PrivX REST transport.
//!
//! Talks to the vault API with an OAuth2 client-credentials token. The token
//! is fetched lazily and shared by every request until shortly before it
//! expires.

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::RwLock;
use url::Url;

use super::transport::{SecretDocument, SecretPage, SecretRequest, VaultTransport};
use super::types::SecretString;
use crate::errors::{Error, Result};

/// Seconds before expiry at which a cached token is considered stale.
const TOKEN_REFRESH_MARGIN_SECS: i64 = 30;

/// Lifetime assumed when the token response carries no `expires_in`.
const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 300;

const TOKEN_PATH: &[&str] = &["auth", "api", "v1", "oauth", "token"];
const SECRETS_PATH: &[&str] = &["vault", "api", "v1", "secrets"];

/// OAuth client credentials for the PrivX API.
#[derive(Debug, Clone, Default)]
pub struct OAuthCredentials {
    pub client_id: SecretString,
    pub client_secret: SecretString,
}

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: SecretString,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn is_fresh(&self) -> bool {
        self.expires_at > Utc::now()
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: SecretString,
    #[serde(default)]
    expires_in: Option<i64>,
}

/// Error body PrivX attaches to failed calls.
#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error_message: Option<String>,
}

/// [`VaultTransport`] over the PrivX REST API.
#[derive(Debug)]
pub struct PrivxHttpTransport {
    client: Client,
    base_url: Url,
    credentials: OAuthCredentials,
    token: RwLock<Option<CachedToken>>,
}

impl PrivxHttpTransport {
    pub fn new(base_url: Url, credentials: OAuthCredentials, timeout: Duration) -> Result<Self> {
        if base_url.cannot_be_a_base() {
            return Err(Error::validation_field(
                format!("Server address '{}' cannot be used as a base URL", base_url),
                "server",
            ));
        }

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url,
            credentials,
            token: RwLock::new(None),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Append percent-encoded path segments to the server address.
    fn endpoint(&self, prefix: &[&str], name: Option<&str>) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                Error::config(format!(
                    "Server address '{}' cannot be a base",
                    self.base_url
                ))
            })?;
            segments.pop_if_empty().extend(prefix);
            if let Some(name) = name {
                segments.push(name);
            }
        }
        Ok(url)
    }

    /// Current access token, fetching a new one when the cached token is stale.
    async fn access_token(&self) -> Result<SecretString> {
        if let Some(token) = self.token.read().await.as_ref().filter(|t| t.is_fresh()) {
            return Ok(token.access_token.clone());
        }

        let mut cached = self.token.write().await;
        if let Some(token) = cached.as_ref().filter(|t| t.is_fresh()) {
            return Ok(token.access_token.clone());
        }

        let response = self
            .client
            .post(self.endpoint(TOKEN_PATH, None)?)
            .basic_auth(
                self.credentials.client_id.expose_secret(),
                Some(self.credentials.client_secret.expose_secret()),
            )
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;
        let token: TokenResponse = check_status(response).await?.json().await?;

        let lifetime = token.expires_in.unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS);
        let expires_at =
            Utc::now() + ChronoDuration::seconds((lifetime - TOKEN_REFRESH_MARGIN_SECS).max(0));
        tracing::debug!(expires_in = lifetime, "Obtained PrivX access token");

        *cached = Some(CachedToken {
            access_token: token.access_token.clone(),
            expires_at,
        });
        Ok(token.access_token)
    }
}

/// Turn a non-2xx response into a transport error carrying the vault's wording.
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let detail = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(|b| b.error_message)
        .filter(|m| !m.is_empty())
        .unwrap_or(body);

    Err(Error::transport(format!("{}: {}", status, detail.trim())))
}

#[async_trait]
impl VaultTransport for PrivxHttpTransport {
    async fn get_document(&self, name: &str) -> Result<SecretDocument> {
        let token = self.access_token().await?;
        let response = self
            .client
            .get(self.endpoint(SECRETS_PATH, Some(name))?)
            .bearer_auth(token.expose_secret())
            .send()
            .await?;

        Ok(check_status(response).await?.json().await?)
    }

    async fn list_documents(&self, offset: usize, limit: usize) -> Result<SecretPage> {
        let token = self.access_token().await?;
        let response = self
            .client
            .get(self.endpoint(SECRETS_PATH, None)?)
            .query(&[("offset", offset), ("limit", limit)])
            .bearer_auth(token.expose_secret())
            .send()
            .await?;

        Ok(check_status(response).await?.json().await?)
    }

    async fn create_or_replace_document(&self, request: &SecretRequest) -> Result<()> {
        let token = self.access_token().await?;
        let response = self
            .client
            .post(self.endpoint(SECRETS_PATH, None)?)
            .bearer_auth(token.expose_secret())
            .json(request)
            .send()
            .await?;

        // PrivX refuses to create over an existing name; overwrite it instead
        if response.status() == StatusCode::CONFLICT {
            tracing::debug!(name = %request.name, "Secret exists, replacing");
            let response = self
                .client
                .put(self.endpoint(SECRETS_PATH, Some(&request.name))?)
                .bearer_auth(token.expose_secret())
                .json(request)
                .send()
                .await?;
            check_status(response).await?;
            return Ok(());
        }

        check_status(response).await?;
        Ok(())
    }

    async fn delete_document(&self, name: &str) -> Result<()> {
        let token = self.access_token().await?;
        let response = self
            .client
            .delete(self.endpoint(SECRETS_PATH, Some(name))?)
            .bearer_auth(token.expose_secret())
            .send()
            .await?;

        check_status(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::is_not_found;
    use serde_json::json;
    use tracing_test::traced_test;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mock_token(server: &MockServer, expected_calls: u64) {
        Mock::given(method("POST"))
            .and(path("/auth/api/v1/oauth/token"))
            // base64("id:secret")
            .and(header("authorization", "Basic aWQ6c2VjcmV0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "tok-123",
                "token_type": "Bearer",
                "expires_in": 3600
            })))
            .expect(expected_calls)
            .mount(server)
            .await;
    }

    fn transport(server: &MockServer) -> PrivxHttpTransport {
        let credentials = OAuthCredentials {
            client_id: SecretString::new("id"),
            client_secret: SecretString::new("secret"),
        };
        PrivxHttpTransport::new(
            Url::parse(&server.uri()).unwrap(),
            credentials,
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_get_document_uses_bearer_token() {
        let server = MockServer::start().await;
        mock_token(&server, 1).await;
        Mock::given(method("GET"))
            .and(path("/vault/api/v1/secrets/db"))
            .and(header("authorization", "Bearer tok-123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "db",
                "data": {"user": "admin"},
                "read_roles": [],
                "author": "someone"
            })))
            .mount(&server)
            .await;

        let doc = transport(&server).get_document("db").await.unwrap();
        assert_eq!(doc.name, "db");
        assert_eq!(doc.data.unwrap()["user"], json!("admin"));
    }

    #[tokio::test]
    async fn test_token_is_cached_across_requests() {
        let server = MockServer::start().await;
        mock_token(&server, 1).await;
        Mock::given(method("GET"))
            .and(path("/vault/api/v1/secrets/db"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "db"
            })))
            .expect(3)
            .mount(&server)
            .await;

        let transport = transport(&server);
        for _ in 0..3 {
            transport.get_document("db").await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_missing_secret_keeps_vault_wording() {
        let server = MockServer::start().await;
        mock_token(&server, 1).await;
        Mock::given(method("GET"))
            .and(path("/vault/api/v1/secrets/nope"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "error_code": "NOT_FOUND",
                "error_message": "Secret not found"
            })))
            .mount(&server)
            .await;

        let err = transport(&server).get_document("nope").await.unwrap_err();
        assert!(is_not_found(&err));
        assert!(err.to_string().contains("404 Not Found"));
    }

    #[tokio::test]
    async fn test_server_error_is_not_not_found() {
        let server = MockServer::start().await;
        mock_token(&server, 1).await;
        Mock::given(method("DELETE"))
            .and(path("/vault/api/v1/secrets/db"))
            .respond_with(
                ResponseTemplate::new(500).set_body_string("upstream unavailable"),
            )
            .mount(&server)
            .await;

        let err = transport(&server).delete_document("db").await.unwrap_err();
        assert!(!is_not_found(&err));
        assert!(err.to_string().contains("upstream unavailable"));
    }

    #[tokio::test]
    async fn test_list_documents_sends_paging_parameters() {
        let server = MockServer::start().await;
        mock_token(&server, 1).await;
        Mock::given(method("GET"))
            .and(path("/vault/api/v1/secrets"))
            .and(query_param("offset", "100"))
            .and(query_param("limit", "100"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "count": 101,
                "items": [{"name": "last"}]
            })))
            .mount(&server)
            .await;

        let page = transport(&server).list_documents(100, 100).await.unwrap();
        assert_eq!(page.count, 101);
        assert_eq!(page.items[0].name, "last");
    }

    #[tokio::test]
    async fn test_create_falls_back_to_replace_on_conflict() {
        let server = MockServer::start().await;
        mock_token(&server, 1).await;

        let mut data = serde_json::Map::new();
        data.insert("k".into(), json!("dg=="));
        let request = SecretRequest {
            name: "app".into(),
            data,
            ..SecretRequest::default()
        };
        let expected_body = json!({
            "name": "app",
            "read_roles": [],
            "write_roles": [],
            "data": {"k": "dg=="}
        });

        Mock::given(method("POST"))
            .and(path("/vault/api/v1/secrets"))
            .and(body_json(&expected_body))
            .respond_with(ResponseTemplate::new(409).set_body_json(json!({
                "error_code": "SECRET_ALREADY_EXISTS",
                "error_message": "Secret already exists"
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/vault/api/v1/secrets/app"))
            .and(body_json(&expected_body))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        transport(&server)
            .create_or_replace_document(&request)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_rejected_credentials_fail_every_call() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/api/v1/oauth/token"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": "invalid_client"
            })))
            .mount(&server)
            .await;

        let err = transport(&server).get_document("db").await.unwrap_err();
        assert!(err.to_string().contains("401"));
        assert!(!is_not_found(&err));
    }

    #[tokio::test]
    #[traced_test]
    async fn test_token_is_never_logged() {
        let server = MockServer::start().await;
        mock_token(&server, 1).await;
        Mock::given(method("GET"))
            .and(path("/vault/api/v1/secrets/db"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "db"
            })))
            .mount(&server)
            .await;

        transport(&server).get_document("db").await.unwrap();

        assert!(logs_contain("Obtained PrivX access token"));
        assert!(!logs_contain("tok-123"));
    }

    #[test]
    fn test_rejects_non_base_url() {
        let url = Url::parse("mailto:privx@example.com").unwrap();
        let err = PrivxHttpTransport::new(url, OAuthCredentials::default(), Duration::from_secs(1))
            .unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
    }
}
