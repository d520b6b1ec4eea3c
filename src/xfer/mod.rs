pub mod command;
pub mod frames;
pub mod handlers;
pub mod session;
pub mod session_state;
pub mod utils;

pub use session::XferSession;
pub use session_state::*;
