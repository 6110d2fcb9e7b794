use base64::prelude::*;
use ip_network::IpNetwork;
use std::fmt;
use std::net::SocketAddr;
use std::time::{Duration, SystemTime};

use crate::error::{ControlError, ControlResult};

/// Length in bytes of a WireGuard key
pub const KEY_LEN: usize = 32;

/// A WireGuard public key
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Key([u8; KEY_LEN]);

impl Key {
    pub fn new(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    pub fn zero() -> Self {
        Self([0u8; KEY_LEN])
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }

    /// Decode a base64-encoded key
    pub fn from_base64(s: &str) -> ControlResult<Self> {
        let bytes = BASE64_STANDARD
            .decode(s.trim())
            .map_err(|e| ControlError::InvalidKey(format!("Invalid base64: {}", e)))?;
        Self::from_slice(&bytes)
    }

    /// Decode a hex-encoded key, as used by the UAPI protocol
    pub fn from_hex(s: &str) -> ControlResult<Self> {
        let bytes = hex::decode(s.trim())
            .map_err(|e| ControlError::InvalidKey(format!("Invalid hex: {}", e)))?;
        Self::from_slice(&bytes)
    }

    fn from_slice(bytes: &[u8]) -> ControlResult<Self> {
        let key: [u8; KEY_LEN] = bytes.try_into().map_err(|_| {
            ControlError::InvalidKey(format!(
                "Key must be {} bytes, got {}",
                KEY_LEN,
                bytes.len()
            ))
        })?;
        Ok(Self(key))
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&BASE64_STANDARD.encode(self.0))
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Key({})", self)
    }
}

/// How a device is implemented
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceType {
    /// In-kernel device, reported by its link kind
    Kernel,
    /// Userspace implementation reachable through a UAPI socket
    Userspace,
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceType::Kernel => f.write_str("wireguard"),
            DeviceType::Userspace => f.write_str("userspace"),
        }
    }
}

/// Snapshot of one WireGuard interface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceRecord {
    pub name: String,
    pub device_type: DeviceType,
    pub public_key: Key,
    pub listen_port: u16,
    /// Peers in the order the source reported them
    pub peers: Vec<PeerRecord>,
}

impl DeviceRecord {
    pub fn new(name: impl Into<String>, device_type: DeviceType) -> Self {
        Self {
            name: name.into(),
            device_type,
            public_key: Key::zero(),
            listen_port: 0,
            peers: Vec::new(),
        }
    }
}

/// Snapshot of one peer of a device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerRecord {
    pub public_key: Key,
    pub endpoint: Option<SocketAddr>,
    pub allowed_ips: Vec<IpNetwork>,
    /// `None` when no handshake has completed yet
    pub last_handshake: Option<SystemTime>,
    pub rx_bytes: u64,
    pub tx_bytes: u64,
    /// Zero when keepalives are disabled
    pub persistent_keepalive: Duration,
}

impl PeerRecord {
    pub fn new(public_key: Key) -> Self {
        Self {
            public_key,
            endpoint: None,
            allowed_ips: Vec::new(),
            last_handshake: None,
            rx_bytes: 0,
            tx_bytes: 0,
            persistent_keepalive: Duration::ZERO,
        }
    }
}

/// Parse an allowed-IP entry, clearing any host bits
pub fn parse_allowed_ip(s: &str) -> ControlResult<IpNetwork> {
    let s = s.trim();
    let (addr, prefix) = s
        .split_once('/')
        .ok_or_else(|| ControlError::Parse(format!("Invalid allowed IP: {}", s)))?;

    let addr: std::net::IpAddr = addr
        .parse()
        .map_err(|_| ControlError::Parse(format!("Invalid allowed IP: {}", s)))?;
    let prefix: u8 = prefix
        .parse()
        .map_err(|_| ControlError::Parse(format!("Invalid allowed IP prefix: {}", s)))?;

    IpNetwork::new_truncate(addr, prefix)
        .map_err(|_| ControlError::Parse(format!("Invalid allowed IP: {}", s)))
}

/// Convert a (seconds, nanoseconds) pair into a handshake time, zero meaning never
pub fn handshake_time(secs: u64, nanos: u32) -> ControlResult<Option<SystemTime>> {
    if secs == 0 && nanos == 0 {
        return Ok(None);
    }

    Duration::from_secs(secs)
        .checked_add(Duration::from_nanos(u64::from(nanos)))
        .and_then(|since_epoch| SystemTime::UNIX_EPOCH.checked_add(since_epoch))
        .map(Some)
        .ok_or_else(|| {
            ControlError::Parse(format!(
                "Handshake time out of range: {}s {}ns",
                secs, nanos
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_base64_display() {
        let key = Key::new([0xAB; KEY_LEN]);
        let encoded = key.to_string();
        assert_eq!(encoded.len(), 44);
        assert_eq!(Key::from_base64(&encoded).unwrap(), key);
    }

    #[test]
    fn test_key_from_hex() {
        let hex = "01".repeat(KEY_LEN);
        let key = Key::from_hex(&hex).unwrap();
        assert_eq!(key.as_bytes(), &[1u8; KEY_LEN]);
    }

    #[test]
    fn test_key_wrong_length() {
        assert!(Key::from_hex("0102").is_err());
        assert!(Key::from_base64("AAAA").is_err());
    }

    #[test]
    fn test_zero_key() {
        assert!(Key::zero().is_zero());
        assert!(!Key::new([1u8; KEY_LEN]).is_zero());
    }

    #[test]
    fn test_device_type_display() {
        assert_eq!(DeviceType::Kernel.to_string(), "wireguard");
        assert_eq!(DeviceType::Userspace.to_string(), "userspace");
    }

    #[test]
    fn test_parse_allowed_ip_truncates_host_bits() {
        let net = parse_allowed_ip("10.0.0.7/24").unwrap();
        assert_eq!(net.to_string(), "10.0.0.0/24");
    }

    #[test]
    fn test_parse_allowed_ip_v6() {
        let net = parse_allowed_ip("fd00::2/128").unwrap();
        assert_eq!(net.to_string(), "fd00::2/128");
    }

    #[test]
    fn test_parse_allowed_ip_requires_prefix() {
        assert!(parse_allowed_ip("10.0.0.1").is_err());
        assert!(parse_allowed_ip("10.0.0.1/33").is_err());
    }

    #[test]
    fn test_handshake_time_zero_is_never() {
        assert_eq!(handshake_time(0, 0).unwrap(), None);
        assert_eq!(
            handshake_time(1_700_000_000, 5).unwrap(),
            Some(SystemTime::UNIX_EPOCH + Duration::new(1_700_000_000, 5))
        );
    }

    #[test]
    fn test_handshake_time_out_of_range() {
        let err = handshake_time(u64::MAX, 0).unwrap_err();
        assert!(matches!(err, ControlError::Parse(_)));
        let err = handshake_time(u64::MAX, 999_999_999).unwrap_err();
        assert!(matches!(err, ControlError::Parse(_)));
    }
}
