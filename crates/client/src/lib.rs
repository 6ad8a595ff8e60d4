//! Client tier for the SaaS Probe validation backend.
//!
//! - [`api::SaasApi`]: one method per REST operation.
//! - [`auth::AuthContext`]: the shared session; any 401 invalidates it.
//! - [`poller`]: cancellable status polling for a project view.
//! - [`token_store`]: where the access token lives between runs.

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod poller;
pub mod token_store;

pub use api::SaasApi;
pub use auth::{AuthContext, AuthState};
pub use config::ClientConfig;
pub use error::ApiError;
pub use poller::{PollPhase, PollState, PollerConfig, PollerHandle, ProjectSource};
pub use token_store::{FileTokenStore, MemoryTokenStore, TokenStore};
