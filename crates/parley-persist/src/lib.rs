pub mod clock;
pub mod error;
pub mod memory;
pub mod models;
pub mod rate_limit;
pub mod store;

#[cfg(feature = "mongodb")]
pub mod dbs;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{PersistError, Result};
pub use memory::{InMemoryRateWindowStore, InMemorySessionStore};
pub use models::{
    cap_history, generate_session_id, Session, SessionOwner, SessionStats, MAX_STORED_MESSAGES,
    SESSION_ID_PREFIX,
};
pub use rate_limit::{RateLimiter, RateWindowStore};
pub use store::SessionStore;

#[cfg(feature = "mongodb")]
pub use dbs::mongo::{MongoRateWindowStore, MongoSessionStore};
