pub mod session;

pub use session::{
    cap_history, generate_session_id, Session, SessionOwner, SessionStats, MAX_STORED_MESSAGES,
    SESSION_ID_PREFIX,
};
