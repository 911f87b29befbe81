//! Integration tests over the wired service registry.

mod helpers;

mod assignment_test;
mod auth_test;
mod permission_test;
mod postgres_test;
mod user_test;
