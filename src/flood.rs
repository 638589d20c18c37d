use std::net::{SocketAddr, UdpSocket};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use signal_hook::consts::{SIGINT, SIGTERM};

use crate::cli::{FloodOpts, Pacing};
use crate::stats::TxStats;

/// Raw datagram flooder. Independent of the register protocol — it only
/// shares the destination-address idea with the control plane.
pub fn run(opts: FloodOpts) -> Result<()> {
    let pacing = Pacing::from_cli(&opts.gap)?;
    let stop = Arc::new(AtomicBool::new(false));
    signal_hook::flag::register(SIGINT, Arc::clone(&stop)).context("installing SIGINT handler")?;
    signal_hook::flag::register(SIGTERM, Arc::clone(&stop))
        .context("installing SIGTERM handler")?;

    let dest = SocketAddr::new(opts.dest, opts.port);
    let sock = UdpSocket::bind(("0.0.0.0", 0)).context("binding flood socket")?;
    let payload = vec![opts.fill; opts.len];

    eprintln!(
        "[flood] {} bytes of 0x{:02X} to {dest}, gap={}, ctrl-c to stop",
        opts.len, opts.fill, opts.gap
    );

    let mut stats = TxStats::new();
    while !stop.load(Ordering::Relaxed) {
        sock.send_to(&payload, dest).context("udp send")?;
        stats.add(payload.len());
        stats.maybe_print(opts.stats);

        if opts.count != 0 && stats.sent >= opts.count {
            break;
        }
        if let Pacing::Fixed(gap) = pacing {
            std::thread::sleep(gap);
        }
    }

    eprintln!("[flood] done: sent={} bytes={}", stats.sent, stats.bytes);
    Ok(())
}
