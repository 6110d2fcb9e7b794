use async_trait::async_trait;

use super::types::DeviceRecord;
use crate::error::ControlResult;

/// A backend able to report WireGuard devices
#[async_trait]
pub trait DeviceSource: Send + Sync {
    /// Short backend name used in logs
    fn name(&self) -> &'static str;

    /// List every device this backend knows about, in backend order
    async fn devices(&self) -> ControlResult<Vec<DeviceRecord>>;

    /// Fetch a single device by interface name
    ///
    /// Returns `ControlError::DeviceNotFound` when this backend does not own
    /// the device, so callers can try the next backend.
    async fn device(&self, name: &str) -> ControlResult<DeviceRecord>;

    /// Release any resources held by the backend
    async fn close(&self) -> ControlResult<()> {
        Ok(())
    }
}
