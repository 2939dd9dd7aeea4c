//! `Streamroom` Client Library
//!
//! Platform-agnostic core for the video chat client: the live room
//! directory, the credential exchange, and the session state machine the
//! presentation layer renders. No UI lives here; screens subscribe to state
//! and issue commands.

pub mod directory;
pub mod join;
pub mod session;
pub mod storage;

pub use directory::{DirectoryClient, DirectoryEvent, RoomSelection};
pub use join::{JoinCoordinator, JoinError, SessionCredential};
pub use session::{Session, SessionCommand, SessionState};
