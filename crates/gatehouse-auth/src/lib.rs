//! # gatehouse-auth
//!
//! Authentication and session handling for Gatehouse.
//!
//! ## Modules
//!
//! - `password`: Argon2id hashing and password policy enforcement
//! - `jwt`: token signing, validation, and session revocation markers
//! - `session`: login, logout, token resolution, and expired-session purge

pub mod jwt;
pub mod password;
pub mod session;

pub use jwt::{Claims, JwtDecoder, JwtEncoder};
pub use password::{PasswordHasher, PasswordValidator};
pub use session::{LoginResult, SessionCleanup, SessionManager};
