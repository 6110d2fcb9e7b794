use std::path::PathBuf;

/// Default directory holding userspace WireGuard control sockets
pub const DEFAULT_SOCKET_DIR: &str = "/var/run/wireguard";

/// Default name of the `wg` tool, resolved through `PATH`
pub const DEFAULT_WG_BINARY: &str = "wg";

/// Which device backends the control client consults
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Backend {
    /// Userspace sockets first, then `wg` if it is installed
    #[default]
    Auto,
    /// Only userspace control sockets
    Userspace,
    /// Only the `wg` tool (kernel devices)
    Kernel,
}

impl Backend {
    pub fn uses_userspace(&self) -> bool {
        matches!(self, Backend::Auto | Backend::Userspace)
    }

    pub fn uses_kernel(&self) -> bool {
        matches!(self, Backend::Auto | Backend::Kernel)
    }
}

/// Settings for opening the control client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlConfig {
    /// Directory scanned for `<name>.sock` UAPI sockets
    pub socket_dir: PathBuf,
    /// Path or name of the `wg` executable
    pub wg_binary: PathBuf,
    pub backend: Backend,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            socket_dir: PathBuf::from(DEFAULT_SOCKET_DIR),
            wg_binary: PathBuf::from(DEFAULT_WG_BINARY),
            backend: Backend::Auto,
        }
    }
}
