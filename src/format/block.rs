use std::fmt;
use std::time::SystemTime;

use super::bytes::format_bytes;
use super::color::{bold, cyan, green, green_bold, yellow, yellow_bold};
use super::duration::format_duration;
use crate::device::{DeviceRecord, PeerRecord};

/// Shown in place of values the source did not report
const NONE: &str = "(none)";

/// A header line, indented `label: value` fields and a closing blank line
#[derive(Debug, Clone)]
pub struct Block {
    header: String,
    fields: Vec<(&'static str, String)>,
}

impl Block {
    pub fn new(header: String) -> Self {
        Self {
            header,
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, label: &'static str, value: impl Into<String>) -> Self {
        self.fields.push((label, value.into()));
        self
    }

    /// Add the field only when `value` is present
    pub fn optional_field(self, label: &'static str, value: Option<String>) -> Self {
        match value {
            Some(value) => self.field(label, value),
            None => self,
        }
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.header)?;
        for (label, value) in &self.fields {
            writeln!(f, "  {}: {}", bold(label), value)?;
        }
        writeln!(f)
    }
}

pub fn device_block(device: &DeviceRecord) -> Block {
    let header = format!(
        "{}: {} ({})",
        green_bold("interface"),
        green(&device.name),
        device.device_type
    );

    Block::new(header)
        .field("public key", device.public_key.to_string())
        .field("private key", "(hidden)")
        .field("listening port", device.listen_port.to_string())
}

pub fn peer_block(peer: &PeerRecord, now: SystemTime) -> Block {
    let header = format!(
        "{}: {}",
        yellow_bold("peer"),
        yellow(&peer.public_key.to_string())
    );

    let endpoint = peer
        .endpoint
        .map(|e| e.to_string())
        .unwrap_or_else(|| NONE.to_string());

    let handshake = peer.last_handshake.map(|t| {
        let elapsed = now.duration_since(t).unwrap_or_default();
        format!("{} ago", format_duration(elapsed.as_secs()))
    });

    Block::new(header)
        .field("endpoint", endpoint)
        .field("allowed ips", allowed_ips(peer))
        .optional_field("latest handshake", handshake)
        .field(
            "transfer",
            format!(
                "{} received, {} sent",
                format_bytes(peer.rx_bytes),
                format_bytes(peer.tx_bytes)
            ),
        )
        .field(
            "persistent keepalive",
            format!("every {}", format_duration(peer.persistent_keepalive.as_secs())),
        )
}

/// Comma-joined networks with each `/` highlighted
fn allowed_ips(peer: &PeerRecord) -> String {
    if peer.allowed_ips.is_empty() {
        return NONE.to_string();
    }

    peer.allowed_ips
        .iter()
        .map(|net| net.to_string())
        .collect::<Vec<_>>()
        .join(", ")
        .replace('/', &cyan("/"))
}

/// Render every device followed by its peers, in source order
///
/// The result never ends with a newline; blank lines between blocks are kept.
pub fn render_report(devices: &[DeviceRecord], now: SystemTime) -> String {
    let mut out = String::new();

    for device in devices {
        out.push_str(&device_block(device).to_string());
        for peer in &device.peers {
            out.push_str(&peer_block(peer, now).to_string());
        }
    }

    let len = out.trim_end_matches('\n').len();
    out.truncate(len);
    out
}
