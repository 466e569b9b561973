//! Auth module: three-layer architecture (domain, repository, service).
//!
//! Login for customers and mechanics, password hashing, and token
//! issuance/verification for the access gate.

pub mod domain;
pub mod errors;
pub mod password;
pub mod repository;
pub mod service;
pub mod repo;

pub use domain::{Principal, Role};
pub use service::AuthService;
