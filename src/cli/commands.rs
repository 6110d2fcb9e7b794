use std::io::{self, Write};
use std::time::SystemTime;

use crate::config::ControlConfig;
use crate::device::{Client, DeviceRecord};
use crate::error::{Result, WgError};
use crate::format::render_report;

/// Execute the show command: query devices and print the report
pub async fn cmd_show(config: &ControlConfig, device: Option<&str>) -> Result<()> {
    let client = Client::open(config).await.map_err(WgError::Open)?;
    let report = show_and_close(client, device, SystemTime::now()).await?;

    if report.is_empty() {
        tracing::info!("No WireGuard devices found");
        return Ok(());
    }

    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{}", report)?;
    stdout.flush()?;

    Ok(())
}

/// Render the report, then close `client` whether or not the fetch succeeded
pub async fn show_and_close(
    client: Client,
    device: Option<&str>,
    now: SystemTime,
) -> Result<String> {
    let report = show(&client, device, now).await;
    client.close().await;
    report
}

/// Render the report for one named device, or for every device
pub async fn show(client: &Client, device: Option<&str>, now: SystemTime) -> Result<String> {
    let devices = fetch_devices(client, device).await?;
    tracing::debug!("Rendering {} device(s)", devices.len());
    Ok(render_report(&devices, now))
}

async fn fetch_devices(client: &Client, device: Option<&str>) -> Result<Vec<DeviceRecord>> {
    match device {
        Some(name) => {
            let record = client.device(name).await.map_err(|source| WgError::Device {
                name: name.to_string(),
                source,
            })?;
            Ok(vec![record])
        }
        None => client.devices().await.map_err(WgError::Devices),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{DeviceSource, DeviceType, PeerRecord, UapiSource};
    use crate::error::{ControlError, ControlResult};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::UnixListener;

    struct StaticSource(Vec<DeviceRecord>);

    #[async_trait]
    impl DeviceSource for StaticSource {
        fn name(&self) -> &'static str {
            "static"
        }

        async fn devices(&self) -> ControlResult<Vec<DeviceRecord>> {
            Ok(self.0.clone())
        }

        async fn device(&self, name: &str) -> ControlResult<DeviceRecord> {
            self.0
                .iter()
                .find(|d| d.name == name)
                .cloned()
                .ok_or_else(|| ControlError::DeviceNotFound(name.to_string()))
        }
    }

    /// Backend whose queries always fail, recording whether it was closed
    struct BrokenSource {
        closed: Arc<AtomicBool>,
    }

    #[async_trait]
    impl DeviceSource for BrokenSource {
        fn name(&self) -> &'static str {
            "broken"
        }

        async fn devices(&self) -> ControlResult<Vec<DeviceRecord>> {
            Err(ControlError::Backend("permission denied".to_string()))
        }

        async fn device(&self, _name: &str) -> ControlResult<DeviceRecord> {
            Err(ControlError::Backend("permission denied".to_string()))
        }

        async fn close(&self) -> ControlResult<()> {
            self.closed.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    fn broken_client() -> (Client, Arc<AtomicBool>) {
        let closed = Arc::new(AtomicBool::new(false));
        let source = BrokenSource {
            closed: closed.clone(),
        };
        (Client::with_sources(vec![Box::new(source)]), closed)
    }

    fn client() -> Client {
        let mut wg0 = DeviceRecord::new("wg0", DeviceType::Kernel);
        wg0.listen_port = 51820;
        wg0.peers.push(PeerRecord::new(Default::default()));
        let wg1 = DeviceRecord::new("wg1", DeviceType::Kernel);
        Client::with_sources(vec![Box::new(StaticSource(vec![wg0, wg1]))])
    }

    #[tokio::test]
    async fn test_show_all() {
        let report = show(&client(), None, SystemTime::UNIX_EPOCH).await.unwrap();
        assert!(report.contains("wg0"));
        assert!(report.contains("wg1"));
        assert!(!report.ends_with('\n'));
    }

    #[tokio::test]
    async fn test_show_one() {
        let report = show(&client(), Some("wg1"), SystemTime::UNIX_EPOCH)
            .await
            .unwrap();
        assert!(report.contains("wg1"));
        assert!(!report.contains("wg0"));
        assert!(!report.contains("peer"));
    }

    #[tokio::test]
    async fn test_show_unknown_device() {
        let err = show(&client(), Some("wg9"), SystemTime::UNIX_EPOCH)
            .await
            .unwrap_err();
        assert!(matches!(err, WgError::Device { ref name, .. } if name == "wg9"));
        assert!(err.to_string().contains("\"wg9\""));
    }

    #[tokio::test]
    async fn test_client_closed_when_listing_fails() {
        let (client, closed) = broken_client();
        let err = show_and_close(client, None, SystemTime::UNIX_EPOCH)
            .await
            .unwrap_err();

        assert!(matches!(err, WgError::Devices(ControlError::Backend(_))));
        assert!(closed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_client_closed_when_named_lookup_fails() {
        let (client, closed) = broken_client();
        let err = show_and_close(client, Some("wg0"), SystemTime::UNIX_EPOCH)
            .await
            .unwrap_err();

        assert!(matches!(err, WgError::Device { ref name, .. } if name == "wg0"));
        assert!(closed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_show_from_userspace_socket() {
        let dir = tempfile::tempdir().unwrap();
        let listener = UnixListener::bind(dir.path().join("wg0.sock")).unwrap();
        let server = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 7];
            stream.read_exact(&mut request).await.unwrap();
            assert_eq!(&request, b"get=1\n\n");
            let response = format!(
                "listen_port=51820\npublic_key={}\nrx_bytes=2048\ntx_bytes=512\n\
                 persistent_keepalive_interval=25\nallowed_ip=10.0.0.2/32\nerrno=0\n\n",
                "02".repeat(32)
            );
            stream.write_all(response.as_bytes()).await.unwrap();
        });

        let source = UapiSource::open(dir.path()).await.unwrap();
        let client = Client::with_sources(vec![Box::new(source)]);
        let now = SystemTime::UNIX_EPOCH + Duration::from_secs(10);
        let report = show(&client, None, now).await.unwrap();
        server.await.unwrap();

        assert!(report.contains("(userspace)"));
        assert!(report.contains("51820"));
        assert!(report.contains("2.0 "));
        client.close().await;
    }
}
