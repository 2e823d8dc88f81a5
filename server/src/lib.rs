// Declare the main modules
pub mod config;
pub mod db;
pub mod handlers;
pub mod realtime;
pub mod router;
pub mod scheduling;
