use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use anyhow::{Context, Result};
use signal_hook::consts::{SIGINT, SIGTERM};

use crate::cli::MonitorOpts;
use crate::client::RegisterClient;
use crate::transport::UdpTransport;

pub fn run(opts: MonitorOpts) -> Result<()> {
    let stop = Arc::new(AtomicBool::new(false));
    signal_hook::flag::register(SIGINT, Arc::clone(&stop)).context("installing SIGINT handler")?;
    signal_hook::flag::register(SIGTERM, Arc::clone(&stop))
        .context("installing SIGTERM handler")?;

    let client = RegisterClient::new(UdpTransport::new(opts.dev.addr()), opts.dev.client_config());

    eprintln!("[monitor] live packet counter on {}, ctrl-c to stop", opts.dev.addr());
    client.monitor(&stop, |v| {
        print!("\rpackets sent: {v}        ");
        std::io::stdout().flush().ok();
    });
    println!();
    eprintln!("[monitor] stopped");
    Ok(())
}
