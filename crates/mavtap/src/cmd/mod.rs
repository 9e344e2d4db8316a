use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use clap::{Args, Subcommand};
use mavtap_transport::DEFAULT_PORT;

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod decode;
pub mod listen;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Receive telemetry over UDP and print decoded events.
    Listen(ListenArgs),
    /// Decode one hex-encoded frame.
    Decode(DecodeArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Listen(args) => listen::run(args, format),
        Command::Decode(args) => decode::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct ListenArgs {
    /// Address to bind the UDP socket to.
    #[arg(long, env = "MAVTAP_BIND", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub bind: IpAddr,
    /// UDP port to receive telemetry on.
    #[arg(long, env = "MAVTAP_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,
    /// Unix socket path to serve JSON-line events to subscribers.
    #[arg(long, value_name = "PATH")]
    pub subscribers: Option<PathBuf>,
    /// Only relay these message ids (comma-separated).
    #[arg(long, value_delimiter = ',')]
    pub types: Option<Vec<u8>>,
    /// Exit after printing N events.
    #[arg(long)]
    pub count: Option<usize>,
}

impl ListenArgs {
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Frame bytes as hex (whitespace and a leading 0x are ignored).
    pub frame: String,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
