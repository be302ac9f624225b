//! Request authentication for the users API.
//!
//! The pipeline is assembled once from `AuthConfig` and evaluated per request
//! by `auth_middleware`. Each configured scheme becomes one step; all steps
//! must pass.

mod bearer;
mod cookie;
mod middleware;
mod pipeline;

pub use bearer::{BearerVerifier, Claims};
pub use cookie::{CookieVerifier, SessionError};
pub use middleware::auth_middleware;
pub use pipeline::{AuthPipeline, AuthStep, Identity};
