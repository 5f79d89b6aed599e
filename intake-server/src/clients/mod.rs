//! External service clients
//!
//! Thin reqwest wrappers over the remote collaborators this application
//! orchestrates. Each client is a stateless handle over a shared
//! connection pool; call sites receive them through [`ServerState`]
//! rather than constructing their own.
//!
//! [`ServerState`]: crate::core::ServerState

pub mod captcha;
pub mod email;
pub mod identity;
pub mod payments;
pub mod storage;
pub mod store;

pub use captcha::{CaptchaOutcome, CaptchaVerifier};
pub use email::EmailClient;
pub use identity::{IdentityClient, IdentityUser, MfaFactor, SignInSession, StaffClaims};
pub use payments::PaymentsClient;
pub use storage::ObjectStorageClient;
pub use store::{RecordStoreClient, SelectQuery};
