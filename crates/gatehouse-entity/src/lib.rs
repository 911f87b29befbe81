//! # gatehouse-entity
//!
//! Domain entity models for Gatehouse. Every struct in this crate
//! represents a database table row or a domain value object. Row types
//! additionally derive `sqlx::FromRow`.
//!
//! Password credentials live in their own [`user::Credential`] type;
//! [`user::User`] never carries one.

pub mod grant;
pub mod menu;
pub mod role;
pub mod session;
pub mod user;
