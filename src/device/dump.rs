use async_trait::async_trait;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tokio::process::Command;

use super::traits::DeviceSource;
use super::types::{handshake_time, parse_allowed_ip, DeviceRecord, DeviceType, Key, PeerRecord};
use crate::error::{ControlError, ControlResult};

/// Placeholder the `wg` tool prints for unset values
const NONE: &str = "(none)";

/// Placeholder the `wg` tool prints for disabled options
const OFF: &str = "off";

const INTERFACE_FIELDS: usize = 5;
const PEER_FIELDS: usize = 9;

/// Devices read from the tab-separated output of `wg show ... dump`
#[derive(Debug)]
pub struct DumpSource {
    binary: PathBuf,
}

impl DumpSource {
    /// Open the backend, checking that `binary` can be executed
    pub async fn open<P: Into<PathBuf>>(binary: P) -> ControlResult<Self> {
        let binary = binary.into();

        let output = Command::new(&binary)
            .arg("--version")
            .output()
            .await
            .map_err(|e| ControlError::Open(format!("cannot run {}: {}", binary.display(), e)))?;

        tracing::debug!(
            "Using {} ({})",
            binary.display(),
            String::from_utf8_lossy(&output.stdout).trim()
        );

        Ok(Self { binary })
    }

    async fn run(&self, args: &[&str], device: Option<&str>) -> ControlResult<String> {
        tracing::debug!("Running {} {}", self.binary.display(), args.join(" "));

        let output = Command::new(&self.binary)
            .args(args)
            .output()
            .await
            .map_err(|e| {
                ControlError::Backend(format!("failed to run {}: {}", self.binary.display(), e))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(classify_failure(device, stderr.trim()));
        }

        String::from_utf8(output.stdout)
            .map_err(|_| ControlError::Parse("dump output is not UTF-8".to_string()))
    }
}

#[async_trait]
impl DeviceSource for DumpSource {
    fn name(&self) -> &'static str {
        "kernel"
    }

    async fn devices(&self) -> ControlResult<Vec<DeviceRecord>> {
        let output = self.run(&["show", "all", "dump"], None).await?;
        parse_dump(&output)
    }

    async fn device(&self, name: &str) -> ControlResult<DeviceRecord> {
        let output = self.run(&["show", name, "dump"], Some(name)).await?;

        // Single-device dumps omit the leading interface column.
        let prefixed = output
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| format!("{}\t{}", name, line))
            .collect::<Vec<_>>()
            .join("\n");

        parse_dump(&prefixed)?
            .into_iter()
            .next()
            .ok_or_else(|| ControlError::DeviceNotFound(name.to_string()))
    }
}

/// Map a failed `wg` run to a control error
pub fn classify_failure(device: Option<&str>, stderr: &str) -> ControlError {
    match device {
        Some(name) if stderr.contains("No such device") => {
            ControlError::DeviceNotFound(name.to_string())
        }
        _ if stderr.is_empty() => ControlError::Backend("wg exited with an error".to_string()),
        _ => ControlError::Backend(stderr.to_string()),
    }
}

/// Parse `wg show all dump` output into devices, keeping line order
pub fn parse_dump(output: &str) -> ControlResult<Vec<DeviceRecord>> {
    let mut devices: Vec<DeviceRecord> = Vec::new();

    for line in output.lines() {
        if line.trim().is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split('\t').collect();
        match fields.len() {
            INTERFACE_FIELDS => devices.push(parse_interface_line(&fields)?),
            PEER_FIELDS => {
                let peer = parse_peer_line(&fields)?;
                let device = devices
                    .last_mut()
                    .filter(|d| d.name == fields[0])
                    .ok_or_else(|| {
                        ControlError::Parse(format!("peer line for unknown interface {}", fields[0]))
                    })?;
                device.peers.push(peer);
            }
            n => {
                return Err(ControlError::Parse(format!(
                    "unexpected {} fields in dump line",
                    n
                )));
            }
        }
    }

    Ok(devices)
}

fn parse_interface_line(fields: &[&str]) -> ControlResult<DeviceRecord> {
    let mut device = DeviceRecord::new(fields[0], DeviceType::Kernel);

    if fields[2] != NONE {
        device.public_key = Key::from_base64(fields[2])?;
    }
    device.listen_port = parse_field("listen port", fields[3])?;

    Ok(device)
}

fn parse_peer_line(fields: &[&str]) -> ControlResult<PeerRecord> {
    let mut peer = PeerRecord::new(Key::from_base64(fields[1])?);

    if fields[3] != NONE {
        let endpoint = SocketAddr::from_str(fields[3])
            .map_err(|_| ControlError::Parse(format!("Invalid endpoint: {}", fields[3])))?;
        peer.endpoint = Some(endpoint);
    }

    if fields[4] != NONE {
        peer.allowed_ips = fields[4]
            .split(',')
            .map(parse_allowed_ip)
            .collect::<ControlResult<_>>()?;
    }

    peer.last_handshake = handshake_time(parse_field("latest handshake", fields[5])?, 0)?;
    peer.rx_bytes = parse_field("transfer rx", fields[6])?;
    peer.tx_bytes = parse_field("transfer tx", fields[7])?;

    if fields[8] != OFF {
        peer.persistent_keepalive =
            Duration::from_secs(parse_field("persistent keepalive", fields[8])?);
    }

    Ok(peer)
}

fn parse_field<T: FromStr>(what: &str, value: &str) -> ControlResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| ControlError::Parse(format!("Invalid {}: {}", what, value)))
}
