pub mod client_ip;
pub mod config;
pub mod docs;
pub mod error;
pub mod middleware;
pub mod reaper;
pub mod routes;
pub mod state;

pub use routes::build_router;
