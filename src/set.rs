use std::io::Write;

use anyhow::Result;

use crate::cli::SetOpts;
use crate::client::{RegisterClient, WriteOutcome};
use crate::transport::UdpTransport;

pub fn run(opts: SetOpts) -> Result<()> {
    let client = RegisterClient::new(UdpTransport::new(opts.dev.addr()), opts.dev.client_config());

    print!("writing {} = {} ... ", opts.register.to_lowercase(), opts.value);
    std::io::stdout().flush().ok();

    let result = if opts.register.eq_ignore_ascii_case("mode") {
        client.set_mode(&opts.value)
    } else {
        client.set_by_name(&opts.register, &opts.value)
    };
    let outcome = match result {
        Ok(o) => o,
        Err(e) => {
            println!();
            return Err(e.into());
        }
    };

    match outcome {
        WriteOutcome::Pass => println!("PASS"),
        WriteOutcome::Mismatch { expected, actual } => {
            println!("FAIL (got 0x{actual:08X}, expected 0x{expected:08X})")
        }
        WriteOutcome::ReadbackTimeout => println!("READBACK TIMEOUT"),
    }
    Ok(())
}
