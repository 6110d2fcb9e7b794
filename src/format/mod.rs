//! Human-readable, colorized rendering of device and peer records.

pub mod block;
pub mod bytes;
pub mod color;
pub mod duration;

pub use block::{device_block, peer_block, render_report, Block};
pub use bytes::format_bytes;
pub use color::{colorize, Color, Style};
pub use duration::format_duration;
