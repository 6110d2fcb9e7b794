use async_trait::async_trait;
use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixStream;
use x25519_dalek::{PublicKey, StaticSecret};

use super::traits::DeviceSource;
use super::types::{handshake_time, parse_allowed_ip, DeviceRecord, DeviceType, Key, PeerRecord};
use crate::error::{ControlError, ControlResult};

/// Request asking a userspace device for its full configuration
const GET_REQUEST: &[u8] = b"get=1\n\n";

const SOCKET_EXTENSION: &str = "sock";

/// Keys that only make sense after a `public_key` line
const PEER_KEYS: &[&str] = &[
    "preshared_key",
    "endpoint",
    "allowed_ip",
    "last_handshake_time_sec",
    "last_handshake_time_nsec",
    "rx_bytes",
    "tx_bytes",
    "persistent_keepalive_interval",
    "protocol_version",
];

/// Userspace devices reached through UAPI sockets in a directory
#[derive(Debug)]
pub struct UapiSource {
    socket_dir: PathBuf,
}

impl UapiSource {
    /// Open the backend on `socket_dir`
    ///
    /// A missing directory just means no userspace devices are running.
    pub async fn open<P: Into<PathBuf>>(socket_dir: P) -> ControlResult<Self> {
        let socket_dir = socket_dir.into();

        match tokio::fs::metadata(&socket_dir).await {
            Ok(meta) if meta.is_dir() => {
                tokio::fs::read_dir(&socket_dir).await.map_err(|e| {
                    ControlError::Open(format!("cannot read {}: {}", socket_dir.display(), e))
                })?;
            }
            Ok(_) => {
                return Err(ControlError::Open(format!(
                    "{} is not a directory",
                    socket_dir.display()
                )));
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!("Socket directory {} does not exist", socket_dir.display());
            }
            Err(e) => {
                return Err(ControlError::Open(format!(
                    "cannot access {}: {}",
                    socket_dir.display(),
                    e
                )));
            }
        }

        Ok(Self { socket_dir })
    }

    fn socket_path(&self, name: &str) -> PathBuf {
        self.socket_dir.join(format!("{}.{}", name, SOCKET_EXTENSION))
    }

    /// Interface names with a control socket, sorted
    async fn interface_names(&self) -> ControlResult<Vec<String>> {
        let mut entries = match tokio::fs::read_dir(&self.socket_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(SOCKET_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }

        names.sort();
        Ok(names)
    }

    async fn query(&self, name: &str) -> ControlResult<DeviceRecord> {
        let path = self.socket_path(name);

        let stream = match UnixStream::connect(&path).await {
            Ok(stream) => stream,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(ControlError::DeviceNotFound(name.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        tracing::debug!("Querying {} via {}", name, path.display());

        let (reader, mut writer) = stream.into_split();
        writer.write_all(GET_REQUEST).await?;

        let mut lines = BufReader::new(reader).lines();
        let mut response = String::new();
        while let Some(line) = lines.next_line().await? {
            if line.is_empty() {
                break;
            }
            response.push_str(&line);
            response.push('\n');
        }

        parse_get_response(name, &response)
    }
}

#[async_trait]
impl DeviceSource for UapiSource {
    fn name(&self) -> &'static str {
        "userspace"
    }

    async fn devices(&self) -> ControlResult<Vec<DeviceRecord>> {
        let mut devices = Vec::new();
        for name in self.interface_names().await? {
            devices.push(self.query(&name).await?);
        }
        Ok(devices)
    }

    async fn device(&self, name: &str) -> ControlResult<DeviceRecord> {
        self.query(name).await
    }
}

/// Peer under construction while its lines are read
struct PendingPeer {
    record: PeerRecord,
    handshake_sec: u64,
    handshake_nsec: u32,
}

impl PendingPeer {
    fn new(public_key: Key) -> Self {
        Self {
            record: PeerRecord::new(public_key),
            handshake_sec: 0,
            handshake_nsec: 0,
        }
    }

    fn finish(mut self) -> ControlResult<PeerRecord> {
        self.record.last_handshake = handshake_time(self.handshake_sec, self.handshake_nsec)?;
        Ok(self.record)
    }
}

/// Parse the `key=value` body of a `get=1` response
pub fn parse_get_response(name: &str, response: &str) -> ControlResult<DeviceRecord> {
    let mut device = DeviceRecord::new(name, DeviceType::Userspace);
    let mut peer: Option<PendingPeer> = None;
    let mut errno: Option<i64> = None;

    for line in response.lines() {
        if line.is_empty() {
            break;
        }

        let (key, value) = line
            .split_once('=')
            .ok_or_else(|| ControlError::Protocol(format!("malformed line: {:?}", line)))?;

        match key {
            "errno" => {
                errno = Some(parse_value(key, value)?);
                break;
            }
            "private_key" => {
                device.public_key = derive_public_key(&Key::from_hex(value)?);
            }
            "listen_port" => device.listen_port = parse_value(key, value)?,
            "fwmark" => {}
            "public_key" => {
                if let Some(done) = peer.take() {
                    device.peers.push(done.finish()?);
                }
                peer = Some(PendingPeer::new(Key::from_hex(value)?));
            }
            _ => match peer.as_mut() {
                Some(current) => apply_peer_field(current, key, value)?,
                None if PEER_KEYS.contains(&key) => {
                    return Err(ControlError::Protocol(format!(
                        "{} before any public_key",
                        key
                    )));
                }
                None => tracing::trace!("Skipping unknown UAPI key {}", key),
            },
        }
    }

    if let Some(done) = peer.take() {
        device.peers.push(done.finish()?);
    }

    match errno {
        Some(0) => Ok(device),
        Some(code) => Err(ControlError::Protocol(format!(
            "device {} returned errno {}",
            name, code
        ))),
        None => Err(ControlError::Protocol(format!(
            "device {} response has no errno",
            name
        ))),
    }
}

fn apply_peer_field(peer: &mut PendingPeer, key: &str, value: &str) -> ControlResult<()> {
    match key {
        "endpoint" => {
            let endpoint = SocketAddr::from_str(value)
                .map_err(|_| ControlError::Parse(format!("Invalid endpoint: {}", value)))?;
            peer.record.endpoint = Some(endpoint);
        }
        "allowed_ip" => peer.record.allowed_ips.push(parse_allowed_ip(value)?),
        "last_handshake_time_sec" => peer.handshake_sec = parse_value(key, value)?,
        "last_handshake_time_nsec" => peer.handshake_nsec = parse_value(key, value)?,
        "rx_bytes" => peer.record.rx_bytes = parse_value(key, value)?,
        "tx_bytes" => peer.record.tx_bytes = parse_value(key, value)?,
        "persistent_keepalive_interval" => {
            peer.record.persistent_keepalive = Duration::from_secs(parse_value(key, value)?);
        }
        "preshared_key" | "protocol_version" => {}
        _ => tracing::trace!("Skipping unknown UAPI key {}", key),
    }
    Ok(())
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> ControlResult<T> {
    value
        .parse()
        .map_err(|_| ControlError::Parse(format!("Invalid {}: {}", key, value)))
}

/// Public key for a device private key; an unset private key has no public key
fn derive_public_key(private_key: &Key) -> Key {
    if private_key.is_zero() {
        return Key::zero();
    }
    let secret = StaticSecret::from(*private_key.as_bytes());
    Key::new(PublicKey::from(&secret).to_bytes())
}
