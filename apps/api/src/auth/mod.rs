//! Authentication and access control.
//!
//! Tokens are verified by the `Identity` extractor; role and ownership rules are
//! layered on top as further extractors and pure predicates in `guard`.

pub mod guard;
pub mod handlers;
pub mod password;
pub mod token;

pub use guard::{ensure_owner, AdminIdentity, ApplicationScope, Identity, UserIdentity};
pub use password::PasswordHasher;
pub use token::TokenService;
