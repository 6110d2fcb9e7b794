//! wgshow - WireGuard interface and peer status viewer
//!
//! This library queries WireGuard devices and renders their state as
//! colorized, human-readable text blocks, in the style of `wg show`.
//!
//! # Features
//!
//! - Userspace devices through UAPI control sockets
//! - Kernel devices through `wg show ... dump`
//! - Durations broken down into days/hours/minutes/seconds
//! - Byte counters in binary (KiB, MiB, ...) units
//!
//! # Example
//!
//! ```no_run
//! use std::time::SystemTime;
//! use wgshow::config::ControlConfig;
//! use wgshow::device::Client;
//! use wgshow::format::render_report;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let client = Client::open(&ControlConfig::default()).await.unwrap();
//! let devices = client.devices().await.unwrap();
//! println!("{}", render_report(&devices, SystemTime::now()));
//! client.close().await;
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod device;
pub mod error;
pub mod format;

pub use error::{ControlError, Result, WgError};
