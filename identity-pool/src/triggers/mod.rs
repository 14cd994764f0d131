//! User pool lifecycle hooks.
pub mod events;
pub mod post_authentication;
pub mod pre_signup;

pub use events::{PostAuthenticationEvent, PreSignUpEvent};
pub use post_authentication::{handle_post_authentication, TriggerError};
pub use pre_signup::handle_pre_signup;
