//! Robin Auth — credential issuance and verification, password
//! checks, the admin bootstrap and the login flows built on them.

pub mod bootstrap;
pub mod config;
pub mod error;
pub mod password;
pub mod service;
mod store;
pub mod token;
pub mod verifier;

pub use bootstrap::ensure_admin_exists;
pub use config::AuthConfig;
pub use error::AuthError;
pub use service::{
    AuthService, LoginInput, LoginOutput, RegisterInput, SessionStatus, UpdateUserInput,
};
pub use token::{Claims, Purpose, TokenIssuer};
pub use verifier::{TokenVerifier, Verdict};
