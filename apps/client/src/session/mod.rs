// Session: bearer-token lifecycle and the single persisted token slot.

pub mod manager;
pub mod storage;

pub use manager::{Session, SessionManager, SessionStatus};
pub use storage::{FileTokenStore, MemoryTokenStore, TokenStore};
