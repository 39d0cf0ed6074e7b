pub mod auth;
pub mod fmt;
pub mod rate_limit;
pub mod usecase;
