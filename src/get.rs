use anyhow::Result;

use crate::cli::GetOpts;
use crate::client::{Reading, RegisterClient};
use crate::transport::UdpTransport;

pub fn run(opts: GetOpts) -> Result<()> {
    let client = RegisterClient::new(UdpTransport::new(opts.dev.addr()), opts.dev.client_config());
    let (reg, reading) = client.read_by_name(&opts.register)?;
    match reading {
        // either half resolves to the combined 64-bit counter
        Reading::SeqCounter(_) => println!("seq_num: {reading}"),
        _ => println!("{}: {reading}", reg.name),
    }
    Ok(())
}
