pub mod client;
pub mod dump;
pub mod traits;
pub mod types;
pub mod uapi;

pub use client::Client;
pub use dump::DumpSource;
pub use traits::DeviceSource;
pub use types::{DeviceRecord, DeviceType, Key, PeerRecord};
pub use uapi::UapiSource;
