pub mod admin;
pub mod announcements;
pub mod attendance;
pub mod auth;
pub mod finance;
pub mod members;
