pub mod account;
pub mod provider;
pub mod session;

pub use account::{Account, AccountView, UserStatus};
pub use provider::{FederatedProvider, ProviderIdentity, ProviderProfile};
pub use session::SessionTokens;
