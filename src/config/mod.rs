pub mod types;

pub use types::{Backend, ControlConfig, DEFAULT_SOCKET_DIR, DEFAULT_WG_BINARY};
