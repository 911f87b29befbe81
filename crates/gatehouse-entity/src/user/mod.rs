//! User domain entities.

pub mod credential;
pub mod model;
pub mod status;

pub use credential::{Credential, PasswordChange};
pub use model::{NewUser, ProfileUpdate, UpdateUser, User};
pub use status::UserStatus;
