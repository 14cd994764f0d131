//! frontend-auth: the browser application's view of the identity stack.
//!
//! Builds the auth SDK configuration from the published stacks record and
//! calls the two private API routes, signing requests or attaching the
//! current session's access token.
pub mod client;
pub mod config;
pub mod constants;
pub mod error;
pub mod hosted_ui;
pub mod session;

pub use client::{ApiClient, SigningCredentials};
pub use config::ClientConfiguration;
pub use error::FrontendError;
pub use hosted_ui::HostedUi;
pub use session::{InMemorySessionStore, RefreshingSessionStore, Session, SessionProvider};
