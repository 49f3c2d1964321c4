pub mod auth;

pub use auth::RequireUser;
