pub mod auth;
pub mod extract;

pub use auth::{SESSION_COOKIE, Session};
pub use extract::{ChurchJson, ChurchQuery};
