//! Remote authentication API.
//!
//! [`AuthApi`] is the seam the session container talks through;
//! [`HttpAuthApi`] is the reqwest implementation against the boutique
//! REST backend. Any `401` it sees purges the attached credential store,
//! whichever call triggered it.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::SessionConfig;
use crate::credentials::CredentialStore;
use crate::error::ApiError;
use crate::identity::Identity;

/// Endpoint paths, relative to `api_url + api_prefix`.
pub mod endpoints {
    pub const LOGIN: &str = "/auth/login/";
    pub const LOGOUT: &str = "/auth/logout/";
    pub const REGISTER: &str = "/auth/register/";
    pub const ME: &str = "/auth/me/";
    pub const CHANGE_PASSWORD: &str = "/auth/change-password/";
}

const FALLBACK_MESSAGE: &str = "request failed";

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    /// Access token, sent back as `Authorization: Bearer ...`.
    pub access: String,
    #[serde(default)]
    pub refresh: Option<String>,
    pub user: Identity,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

#[async_trait]
pub trait AuthApi: Send + Sync + 'static {
    async fn login(&self, req: &LoginRequest) -> Result<LoginResponse, ApiError>;

    /// Tell the server the session is over. `token` may be absent when
    /// nothing is held locally any more.
    async fn logout(&self, token: Option<&str>) -> Result<(), ApiError>;

    async fn register(&self, req: &RegisterRequest) -> Result<Identity, ApiError>;

    /// Current identity for a bearer token.
    async fn me(&self, token: &str) -> Result<Identity, ApiError>;

    async fn change_password(
        &self,
        token: &str,
        req: &ChangePasswordRequest,
    ) -> Result<(), ApiError>;
}

/// HTTP implementation of [`AuthApi`].
pub struct HttpAuthApi {
    http: reqwest::Client,
    config: SessionConfig,
    credentials: Option<CredentialStore>,
}

impl HttpAuthApi {
    pub fn new(config: SessionConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            http,
            config,
            credentials: None,
        })
    }

    /// Purge `credentials` whenever the server answers `401`.
    #[must_use]
    pub fn with_credentials(mut self, credentials: CredentialStore) -> Self {
        self.credentials = Some(credentials);
        self
    }

    fn url(&self, endpoint: &str) -> String {
        self.config.endpoint_url(endpoint)
    }

    fn authed(builder: reqwest::RequestBuilder, token: Option<&str>) -> reqwest::RequestBuilder {
        match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Map non-2xx responses to `ApiError::Server`, purging credentials
    /// on `401`.
    async fn check(&self, resp: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        if status == StatusCode::UNAUTHORIZED {
            warn!("auth api: token rejected ({}), clearing stored credentials", resp.url().path());
            if let Some(credentials) = &self.credentials {
                if let Err(e) = credentials.clear() {
                    warn!("auth api: clearing credentials failed: {}", e);
                }
            }
        }
        let body = resp.text().await.unwrap_or_default();
        Err(ApiError::Server {
            status: status.as_u16(),
            message: error_message(&body),
        })
    }

    async fn parse<R: DeserializeOwned>(&self, resp: reqwest::Response) -> Result<R, ApiError> {
        let resp = self.check(resp).await?;
        resp.json::<R>()
            .await
            .map_err(|e| ApiError::Decode(format!("response body: {}", e)))
    }
}

/// Pull a human-readable message out of an error body: `message`, then
/// `detail`, then a generic fallback.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            ["message", "detail"]
                .iter()
                .find_map(|k| v.get(*k).and_then(|m| m.as_str()).map(str::to_string))
        })
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| FALLBACK_MESSAGE.to_string())
}

#[async_trait]
impl AuthApi for HttpAuthApi {
    async fn login(&self, req: &LoginRequest) -> Result<LoginResponse, ApiError> {
        debug!("auth api: POST {}", endpoints::LOGIN);
        let resp = self.http.post(self.url(endpoints::LOGIN)).json(req).send().await?;
        self.parse(resp).await
    }

    async fn logout(&self, token: Option<&str>) -> Result<(), ApiError> {
        debug!("auth api: POST {}", endpoints::LOGOUT);
        let req = Self::authed(self.http.post(self.url(endpoints::LOGOUT)), token);
        let resp = req.send().await?;
        self.check(resp).await?;
        Ok(())
    }

    async fn register(&self, req: &RegisterRequest) -> Result<Identity, ApiError> {
        debug!("auth api: POST {}", endpoints::REGISTER);
        let resp = self.http.post(self.url(endpoints::REGISTER)).json(req).send().await?;
        self.parse(resp).await
    }

    async fn me(&self, token: &str) -> Result<Identity, ApiError> {
        debug!("auth api: GET {}", endpoints::ME);
        let req = Self::authed(self.http.get(self.url(endpoints::ME)), Some(token));
        let resp = req.send().await?;
        self.parse(resp).await
    }

    async fn change_password(
        &self,
        token: &str,
        req: &ChangePasswordRequest,
    ) -> Result<(), ApiError> {
        debug!("auth api: POST {}", endpoints::CHANGE_PASSWORD);
        let builder = self.http.post(self.url(endpoints::CHANGE_PASSWORD)).json(req);
        let resp = Self::authed(builder, Some(token)).send().await?;
        self.check(resp).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::{HeaderMap, StatusCode};
    use axum::response::{IntoResponse, Response};
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use boutique_kv::MemoryStore;
    use serde_json::{json, Value};

    use super::*;
    use crate::identity::Role;

    const GOOD_TOKEN: &str = "access-admin";

    fn admin_json() -> Value {
        json!({
            "id": "1",
            "email": "admin@boutique.com",
            "first_name": "Admin",
            "last_name": "Boutique",
            "role": "admin",
            "is_admin": true,
            "permissions": []
        })
    }

    fn bearer(headers: &HeaderMap) -> Option<&str> {
        headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
    }

    async fn login_handler(Json(body): Json<Value>) -> Response {
        if body["email"] == "admin@boutique.com" && body["password"] == "admin123" {
            Json(json!({
                "access": GOOD_TOKEN,
                "refresh": "refresh-admin",
                "user": admin_json(),
            }))
            .into_response()
        } else {
            (
                StatusCode::BAD_REQUEST,
                Json(json!({"detail": "Invalid email or password"})),
            )
                .into_response()
        }
    }

    async fn me_handler(headers: HeaderMap) -> Response {
        match bearer(&headers) {
            Some(GOOD_TOKEN) => Json(admin_json()).into_response(),
            _ => (
                StatusCode::UNAUTHORIZED,
                Json(json!({"message": "Token is invalid or expired"})),
            )
                .into_response(),
        }
    }

    async fn register_handler(Json(body): Json<Value>) -> Response {
        if body["email"] == "taken@boutique.com" {
            return (StatusCode::BAD_REQUEST, "not json at all").into_response();
        }
        (
            StatusCode::CREATED,
            Json(json!({
                "id": "55",
                "email": body["email"],
                "first_name": body["first_name"],
                "last_name": body["last_name"],
                "role": "customer",
                "is_customer": true,
            })),
        )
            .into_response()
    }

    struct TestServer {
        config: SessionConfig,
    }

    async fn start_test_server() -> TestServer {
        let app = Router::new()
            .route("/api/auth/login/", post(login_handler))
            .route("/api/auth/logout/", post(|| async { StatusCode::INTERNAL_SERVER_ERROR }))
            .route("/api/auth/register/", post(register_handler))
            .route("/api/auth/me/", get(me_handler))
            .route(
                "/api/auth/change-password/",
                post(|headers: HeaderMap| async move {
                    if bearer(&headers) == Some(GOOD_TOKEN) {
                        StatusCode::NO_CONTENT
                    } else {
                        StatusCode::UNAUTHORIZED
                    }
                }),
            );

        // Bind to random port.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        TestServer {
            config: SessionConfig {
                api_url: format!("http://{}", addr),
                ..SessionConfig::default()
            },
        }
    }

    fn login_req(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: email.into(),
            password: password.into(),
        }
    }

    #[test]
    fn error_message_extraction() {
        assert_eq!(error_message(r#"{"message":"m","detail":"d"}"#), "m");
        assert_eq!(error_message(r#"{"detail":"d"}"#), "d");
        assert_eq!(error_message(r#"{"errors":{}}"#), FALLBACK_MESSAGE);
        assert_eq!(error_message("<html>500</html>"), FALLBACK_MESSAGE);
        assert_eq!(error_message(""), FALLBACK_MESSAGE);
    }

    #[tokio::test]
    async fn login_success_returns_tokens_and_identity() {
        let server = start_test_server().await;
        let api = HttpAuthApi::new(server.config.clone()).unwrap();

        let resp = api.login(&login_req("admin@boutique.com", "admin123")).await.unwrap();
        assert_eq!(resp.access, GOOD_TOKEN);
        assert_eq!(resp.refresh.as_deref(), Some("refresh-admin"));
        assert_eq!(resp.user.role, Role::Admin);
    }

    #[tokio::test]
    async fn login_failure_carries_server_detail() {
        let server = start_test_server().await;
        let api = HttpAuthApi::new(server.config.clone()).unwrap();

        let err = api.login(&login_req("admin@boutique.com", "nope")).await.unwrap_err();
        assert_eq!(err.status(), Some(400));
        assert_eq!(err.to_string(), "Invalid email or password");
    }

    #[tokio::test]
    async fn me_sends_bearer_token() {
        let server = start_test_server().await;
        let api = HttpAuthApi::new(server.config.clone()).unwrap();

        let identity = api.me(GOOD_TOKEN).await.unwrap();
        assert_eq!(identity.email, "admin@boutique.com");
    }

    #[tokio::test]
    async fn unauthorized_purges_attached_credentials() {
        let server = start_test_server().await;
        let credentials = CredentialStore::new(Arc::new(MemoryStore::new()));
        credentials.save_token("stale").unwrap();
        credentials
            .save_identity(&Identity::new("1", "admin@boutique.com", Role::Admin))
            .unwrap();

        let api = HttpAuthApi::new(server.config.clone())
            .unwrap()
            .with_credentials(credentials.clone());

        let err = api.me("stale").await.unwrap_err();
        assert!(err.is_unauthorized());
        assert_eq!(err.to_string(), "Token is invalid or expired");
        assert!(credentials.load_token().is_none());
        assert!(credentials.load_identity().is_none());
    }

    #[tokio::test]
    async fn register_returns_created_identity() {
        let server = start_test_server().await;
        let api = HttpAuthApi::new(server.config.clone()).unwrap();

        let identity = api
            .register(&RegisterRequest {
                email: "new@mail.com".into(),
                password: "pw12345".into(),
                first_name: "Nuevo".into(),
                last_name: "Cliente".into(),
                phone: None,
            })
            .await
            .unwrap();
        assert_eq!(identity.role, Role::Customer);
        assert_eq!(identity.first_name, "Nuevo");
    }

    #[tokio::test]
    async fn non_json_error_body_uses_fallback() {
        let server = start_test_server().await;
        let api = HttpAuthApi::new(server.config.clone()).unwrap();

        let err = api
            .register(&RegisterRequest {
                email: "taken@boutique.com".into(),
                password: "pw".into(),
                first_name: String::new(),
                last_name: String::new(),
                phone: None,
            })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), FALLBACK_MESSAGE);
    }

    #[tokio::test]
    async fn logout_server_error_is_reported() {
        let server = start_test_server().await;
        let api = HttpAuthApi::new(server.config.clone()).unwrap();
        let err = api.logout(None).await.unwrap_err();
        assert_eq!(err.status(), Some(500));
    }

    #[tokio::test]
    async fn change_password_requires_valid_token() {
        let server = start_test_server().await;
        let api = HttpAuthApi::new(server.config.clone()).unwrap();
        let req = ChangePasswordRequest {
            old_password: "a".into(),
            new_password: "b".into(),
        };
        api.change_password(GOOD_TOKEN, &req).await.unwrap();
        assert!(api.change_password("other", &req).await.unwrap_err().is_unauthorized());
    }

    #[tokio::test]
    async fn unreachable_server_is_network_error() {
        // Bind then drop to get a port with nothing listening.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let api = HttpAuthApi::new(SessionConfig {
            api_url: format!("http://{}", addr),
            ..SessionConfig::default()
        })
        .unwrap();
        let err = api.me(GOOD_TOKEN).await.unwrap_err();
        assert!(matches!(err, ApiError::Network(_)));
        assert_eq!(err.to_string(), "could not connect to the server");
    }
}
