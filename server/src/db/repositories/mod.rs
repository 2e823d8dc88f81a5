use diesel::pg::PgConnection;
use diesel::r2d2::{self, ConnectionManager};

// Define the common DBPool type alias, making it available to submodules
pub type DBPool = r2d2::Pool<ConnectionManager<PgConnection>>;

// Declare the repository implementation modules
pub mod availability;
pub mod connections;
pub mod mentor_profiles;
pub mod messages;
pub mod notifications;
pub mod password_reset_tokens;
pub mod sessions;
pub mod users;
