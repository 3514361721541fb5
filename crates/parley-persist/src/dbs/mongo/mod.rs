pub mod models;
pub mod rate_store;
pub mod session_store;

pub use rate_store::MongoRateWindowStore;
pub use session_store::MongoSessionStore;
