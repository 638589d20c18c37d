use anyhow::Result;
use clap::Parser;

mod cli;
mod client;
mod flood;
mod frame;
mod frames;
mod get;
mod monitor;
mod registers;
mod regs;
mod set;
mod stats;
mod transport;

fn main() -> Result<()> {
    let args = cli::Cli::parse();
    match args.cmd {
        cli::Cmd::Set(opts) => set::run(opts),
        cli::Cmd::Get(opts) => get::run(opts),
        cli::Cmd::Monitor(opts) => monitor::run(opts),
        cli::Cmd::Regs => regs::run(),
        cli::Cmd::Flood(opts) => flood::run(opts),
        cli::Cmd::GenFrames(opts) => frames::run(opts),
    }
}
