use anyhow::anyhow;
use clap::{Args, Parser, Subcommand};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use crate::client::ClientConfig;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "pktgen-ctl",
    about = "Remote register control for the FPGA 10G UDP payload generator"
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Cmd,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Cmd {
    /// Write a register and verify by read-back (`set mode <name>` for modes)
    Set(SetOpts),
    /// Read and decode a register
    Get(GetOpts),
    /// Stream the pkt_sent counter until ctrl-c
    Monitor(MonitorOpts),
    /// Print the register catalog and mode table
    Regs,
    /// Blast fixed-payload datagrams at a destination
    Flood(FloodOpts),
    /// Write static MAC/IP/UDP reply frames to a file for testbench playback
    GenFrames(GenFramesOpts),
}

#[derive(Args, Debug, Clone)]
pub struct DeviceOpts {
    /// Device IP address
    #[arg(long, default_value = "192.168.1.123")]
    pub device: IpAddr,
    /// Device UDP port (0xC0DE)
    #[arg(long, default_value_t = 49406)]
    pub port: u16,
    /// Reply timeout per exchange, milliseconds
    #[arg(long, default_value_t = 200)]
    pub timeout_ms: u64,
}

impl DeviceOpts {
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.device, self.port)
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            reply_timeout: Duration::from_millis(self.timeout_ms),
            ..Default::default()
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct SetOpts {
    #[command(flatten)]
    pub dev: DeviceOpts,
    /// Register name (or "mode")
    pub register: String,
    /// Integer value, or a mode name when register is "mode"
    pub value: String,
}

#[derive(Args, Debug, Clone)]
pub struct GetOpts {
    #[command(flatten)]
    pub dev: DeviceOpts,
    /// Register name
    pub register: String,
}

#[derive(Args, Debug, Clone)]
pub struct MonitorOpts {
    #[command(flatten)]
    pub dev: DeviceOpts,
}

#[derive(Args, Debug, Clone)]
pub struct FloodOpts {
    /// Destination IP address
    #[arg(long, default_value = "192.168.1.123")]
    pub dest: IpAddr,
    /// Destination UDP port (the generator's payload sink, not 0xC0DE)
    #[arg(long, default_value_t = 8080)]
    pub port: u16,
    /// Payload length in bytes
    #[arg(long, default_value_t = 12)]
    pub len: usize,
    /// Payload fill byte
    #[arg(long, default_value_t = 0xAA)]
    pub fill: u8,
    /// "max" or milliseconds gap between datagrams
    #[arg(long, default_value = "100")]
    pub gap: String,
    /// Stop after this many packets (0 = until ctrl-c)
    #[arg(long, default_value_t = 0)]
    pub count: u64,
    /// Stats print interval in seconds
    #[arg(long, default_value_t = 1.0)]
    pub stats: f64,
}

#[derive(Args, Debug, Clone)]
pub struct GenFramesOpts {
    /// Output file
    #[arg(long, default_value = "mac-rx-reply.bin")]
    pub out: PathBuf,
    /// Host MAC (frame source)
    #[arg(long, default_value = "AC:70:12:56:41:23")]
    pub src_mac: String,
    /// FPGA MAC (frame destination)
    #[arg(long, default_value = "AC:14:45:FF:AF:C4")]
    pub dst_mac: String,
    /// Host IP
    #[arg(long, default_value = "192.168.1.149")]
    pub src_ip: Ipv4Addr,
    /// FPGA IP
    #[arg(long, default_value = "192.168.1.144")]
    pub dst_ip: Ipv4Addr,
    /// UDP source port
    #[arg(long, default_value_t = 0x4554)]
    pub src_port: u16,
    /// UDP destination port
    #[arg(long, default_value_t = 0x8080)]
    pub dst_port: u16,
    /// Number of frames to generate
    #[arg(long, default_value_t = 16)]
    pub frames: u64,
    /// Payload length of the first frame
    #[arg(long, default_value_t = 8)]
    pub len_base: usize,
    /// Payload growth per frame
    #[arg(long, default_value_t = 7)]
    pub len_step: usize,
}

/// Typed pacing for the flooder, parsed from the --gap string.
#[derive(Debug, Clone, Copy)]
pub enum Pacing {
    Max,
    Fixed(Duration),
}

impl Pacing {
    pub fn from_cli(gap: &str) -> anyhow::Result<Self> {
        if gap.eq_ignore_ascii_case("max") {
            Ok(Pacing::Max)
        } else {
            let ms: u64 = gap
                .parse()
                .map_err(|_| anyhow!("gap must be integer ms or 'max'"))?;
            Ok(Pacing::Fixed(Duration::from_millis(ms)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pacing_from_cli() {
        assert!(matches!(Pacing::from_cli("max").unwrap(), Pacing::Max));
        assert!(matches!(Pacing::from_cli("MAX").unwrap(), Pacing::Max));
        match Pacing::from_cli("5").unwrap() {
            Pacing::Fixed(d) => assert_eq!(d, Duration::from_millis(5)),
            other => panic!("expected fixed gap, got {other:?}"),
        }
        assert!(Pacing::from_cli("fast").is_err());
    }
}
