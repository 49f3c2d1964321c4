//! Sample data: synthetic contacts and the development identity users.

pub mod contacts;
pub mod identity;

pub use contacts::SeedContacts;
