//! Identity primitives: password hashing and policy, claims, cookie sessions.

pub mod claims;
pub mod password;
pub mod session;

pub use claims::{Claim, ClaimsPrincipal, ROLE_CLAIM_TYPE};
pub use session::{CookieSettings, cookie_key};
