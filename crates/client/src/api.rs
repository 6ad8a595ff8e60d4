//! REST client for the validation backend.
//!
//! Every operation is one request. Responses are normalized into
//! `Ok(payload)` or an [`ApiError`]; a 401 from any endpoint invalidates the
//! shared [`AuthContext`] before the error is returned.

use reqwest::{Method, StatusCode};
use saasprobe_core::project::{Project, ProjectCreate, ProjectWithAnalysis, ValidationTask};
use saasprobe_core::subscription::{
    CancellationResult, CheckoutRequest, CheckoutSession, Plan, Subscription,
};
use saasprobe_core::types::DbId;
use saasprobe_core::user::{AuthTokens, LoginCredentials, RegisterData, User};
use serde::de::DeserializeOwned;

use crate::auth::AuthContext;
use crate::config::ClientConfig;
use crate::error::{extract_detail, ApiError};

/// Header carrying a per-request correlation id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// HTTP client for the validation backend.
#[derive(Debug, Clone)]
pub struct SaasApi {
    client: reqwest::Client,
    api_url: String,
    auth: AuthContext,
}

impl SaasApi {
    /// Build a client with the configured request timeout.
    pub fn new(config: &ClientConfig, auth: AuthContext) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self::with_client(client, config.api_url.clone(), auth))
    }

    /// Build a client around an existing [`reqwest::Client`].
    ///
    /// * `api_url` - Base URL without a trailing slash, e.g. `http://host:8000`.
    pub fn with_client(client: reqwest::Client, api_url: String, auth: AuthContext) -> Self {
        Self {
            client,
            api_url,
            auth,
        }
    }

    pub fn auth(&self) -> &AuthContext {
        &self.auth
    }

    // -----------------------------------------------------------------------
    // Auth
    // -----------------------------------------------------------------------

    /// `POST /auth/register`. Does not sign in.
    pub async fn register(&self, data: &RegisterData) -> Result<User, ApiError> {
        data.validate()?;
        let response = self
            .send(self.public_request(Method::POST, "/auth/register").json(data))
            .await?;
        Self::parse_response(response).await
    }

    /// `POST /auth/login`. On success the token is persisted through the
    /// auth context.
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<AuthTokens, ApiError> {
        credentials.validate()?;
        let response = self
            .send(
                self.public_request(Method::POST, "/auth/login")
                    .json(credentials),
            )
            .await?;
        let tokens: AuthTokens = Self::parse_response(response).await?;
        self.auth.sign_in(tokens.access_token.clone())?;
        Ok(tokens)
    }

    /// Register, then log in with the same credentials.
    pub async fn register_and_login(&self, data: &RegisterData) -> Result<User, ApiError> {
        let user = self.register(data).await?;
        self.login(&data.credentials()).await?;
        Ok(user)
    }

    /// Drop the credential locally. The backend keeps no session state.
    pub fn logout(&self) -> Result<(), ApiError> {
        self.auth.sign_out()?;
        Ok(())
    }

    /// `GET /auth/me`.
    pub async fn current_user(&self) -> Result<User, ApiError> {
        let response = self.send(self.request(Method::GET, "/auth/me")).await?;
        Self::parse_response(response).await
    }

    /// Load the user behind the stored token, if there is one.
    ///
    /// Returns `Ok(None)` when no token is held or the backend rejected it.
    /// Any other failure also discards the token and is returned.
    pub async fn restore_session(&self) -> Result<Option<User>, ApiError> {
        if self.auth.token().is_none() {
            return Ok(None);
        }
        match self.current_user().await {
            Ok(user) => Ok(Some(user)),
            Err(ApiError::Unauthorized) => Ok(None),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load current user, discarding token");
                self.auth.sign_out()?;
                Err(e)
            }
        }
    }

    // -----------------------------------------------------------------------
    // Projects
    // -----------------------------------------------------------------------

    /// `GET /projects`.
    pub async fn list_projects(&self) -> Result<Vec<Project>, ApiError> {
        let response = self.send(self.request(Method::GET, "/projects")).await?;
        Self::parse_response(response).await
    }

    /// `POST /projects`. The backend queues validation on creation.
    pub async fn create_project(&self, project: &ProjectCreate) -> Result<Project, ApiError> {
        project.validate()?;
        let response = self
            .send(self.request(Method::POST, "/projects").json(project))
            .await?;
        Self::parse_response(response).await
    }

    /// `GET /projects/{id}`, including the analysis when one exists.
    pub async fn get_project(&self, id: DbId) -> Result<ProjectWithAnalysis, ApiError> {
        let response = self
            .send(self.request(Method::GET, &format!("/projects/{id}")))
            .await?;
        Self::parse_response(response).await
    }

    /// `DELETE /projects/{id}`.
    pub async fn delete_project(&self, id: DbId) -> Result<(), ApiError> {
        self.send(self.request(Method::DELETE, &format!("/projects/{id}")))
            .await?;
        Ok(())
    }

    /// `POST /projects/{id}/validate`. Rejected while already processing.
    pub async fn retry_validation(&self, id: DbId) -> Result<ValidationTask, ApiError> {
        let response = self
            .send(self.request(Method::POST, &format!("/projects/{id}/validate")))
            .await?;
        Self::parse_response(response).await
    }

    // -----------------------------------------------------------------------
    // Billing
    // -----------------------------------------------------------------------

    /// `GET /stripe/subscription`. A user without one reads as status `none`.
    pub async fn get_subscription(&self) -> Result<Subscription, ApiError> {
        let response = self
            .send(self.request(Method::GET, "/stripe/subscription"))
            .await?;
        Self::parse_response(response).await
    }

    /// `POST /stripe/create-checkout-session`.
    pub async fn create_checkout_session(&self, plan: Plan) -> Result<CheckoutSession, ApiError> {
        let response = self
            .send(
                self.request(Method::POST, "/stripe/create-checkout-session")
                    .json(&CheckoutRequest { plan }),
            )
            .await?;
        Self::parse_response(response).await
    }

    /// `POST /stripe/cancel-subscription`. Cancels at period end.
    pub async fn cancel_subscription(&self) -> Result<CancellationResult, ApiError> {
        let response = self
            .send(self.request(Method::POST, "/stripe/cancel-subscription"))
            .await?;
        Self::parse_response(response).await
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    /// Request carrying the bearer token, when one is held.
    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let builder = self.public_request(method, path);
        match self.auth.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    fn public_request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.api_url, path))
            .header(REQUEST_ID_HEADER, uuid::Uuid::new_v4().to_string())
    }

    /// Execute a request and classify non-2xx responses.
    async fn send(&self, builder: reqwest::RequestBuilder) -> Result<reqwest::Response, ApiError> {
        let request = builder.build()?;
        let method = request.method().clone();
        let path = request.url().path().to_string();
        let request_id = request
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();

        let response = match self.client.execute(request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!(%method, %path, %request_id, error = %e, "Request failed");
                return Err(e.into());
            }
        };

        let status = response.status();
        tracing::debug!(%method, %path, %request_id, status = status.as_u16(), "Backend response");

        if status == StatusCode::UNAUTHORIZED {
            self.auth.invalidate();
            return Err(ApiError::Unauthorized);
        }
        if !status.is_success() {
            return Err(Self::classify_failure(response).await);
        }
        Ok(response)
    }

    async fn classify_failure(response: reqwest::Response) -> ApiError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let detail = extract_detail(&body, status.canonical_reason().unwrap_or("Request failed"));
        if status.is_server_error() {
            ApiError::Server {
                status: status.as_u16(),
                detail,
            }
        } else {
            ApiError::Rejected {
                status: status.as_u16(),
                detail,
            }
        }
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))
    }
}
