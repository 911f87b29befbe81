//! User account lifecycle and password changes.

pub mod directory;

pub use directory::UserDirectory;
