pub mod admin;
pub mod role;
pub mod user;
pub mod user_role;

// Re-export models for easier access
pub use admin::*;
pub use role::*;
pub use user::*;
pub use user_role::*;
