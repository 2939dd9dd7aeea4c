//! `Streamroom` Common Library
//!
//! Wire types shared by the server and the client: the directory push
//! protocol and the token exchange.

pub mod protocol;
pub mod types;

pub use protocol::{DirectoryMessage, ErrorBody, TokenRequest, TokenResponse};
pub use types::RoomSummary;
