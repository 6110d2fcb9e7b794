use clap::Parser;
use std::path::PathBuf;

use crate::config::{Backend, ControlConfig, DEFAULT_SOCKET_DIR, DEFAULT_WG_BINARY};

#[derive(Parser, Debug)]
#[command(
    name = "wgshow",
    about = "Show WireGuard interface and peer status",
    version
)]
pub struct Cli {
    /// Interface name (shows all if omitted)
    pub device: Option<String>,

    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Directory holding userspace WireGuard control sockets
    #[arg(long, env = "WG_SOCKET_DIR", default_value = DEFAULT_SOCKET_DIR)]
    pub socket_dir: PathBuf,

    /// The wg tool used to read kernel devices
    #[arg(long, env = "WG_BINARY", default_value = DEFAULT_WG_BINARY)]
    pub wg_binary: PathBuf,

    /// Which device backends to query
    #[arg(long, value_enum, default_value_t = Backend::Auto)]
    pub backend: Backend,
}

impl Cli {
    pub fn log_level(&self) -> tracing::Level {
        match self.verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    }

    pub fn control_config(&self) -> ControlConfig {
        ControlConfig {
            socket_dir: self.socket_dir.clone(),
            wg_binary: self.wg_binary.clone(),
            backend: self.backend,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_command_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_arguments_lists_all() {
        let cli = Cli::try_parse_from(["wgshow"]).unwrap();
        assert_eq!(cli.device, None);
        assert_eq!(cli.log_level(), tracing::Level::WARN);
    }

    #[test]
    fn test_device_argument() {
        let cli = Cli::try_parse_from(["wgshow", "wg0"]).unwrap();
        assert_eq!(cli.device.as_deref(), Some("wg0"));
    }

    #[test]
    fn test_at_most_one_device() {
        assert!(Cli::try_parse_from(["wgshow", "wg0", "wg1"]).is_err());
    }

    #[test]
    fn test_verbosity() {
        let cli = Cli::try_parse_from(["wgshow", "-vv"]).unwrap();
        assert_eq!(cli.log_level(), tracing::Level::DEBUG);
    }

    #[test]
    fn test_control_config() {
        let cli = Cli::try_parse_from([
            "wgshow",
            "--socket-dir",
            "/tmp/wg",
            "--wg-binary",
            "/usr/bin/wg",
            "--backend",
            "kernel",
        ])
        .unwrap();

        let config = cli.control_config();
        assert_eq!(config.socket_dir, PathBuf::from("/tmp/wg"));
        assert_eq!(config.wg_binary, PathBuf::from("/usr/bin/wg"));
        assert_eq!(config.backend, Backend::Kernel);
    }
}
