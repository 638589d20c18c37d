use anyhow::Result;

use crate::registers::{MODES, REGISTERS};

pub fn run() -> Result<()> {
    println!("addr  name            access  description");
    for r in &REGISTERS {
        let access = if r.writable { "rw" } else { "ro" };
        println!("{:>4}  {:<15} {:<6}  {}", r.addr, r.name, access, r.desc);
    }
    println!();
    let modes: Vec<String> = MODES.iter().map(|(n, c)| format!("{n}={c}")).collect();
    println!("modes: {}", modes.join(" "));
    Ok(())
}
