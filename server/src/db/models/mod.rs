// Declare model modules
pub mod availability;
pub mod connections;
pub mod mentor_profiles;
pub mod messages;
pub mod notifications;
pub mod password_reset_tokens;
pub mod sessions;
pub mod users;
