/// One slot in the device register map.
#[derive(Debug, Clone, Copy)]
pub struct Register {
    pub addr: u16,
    pub name: &'static str,
    pub writable: bool,
    pub desc: &'static str,
}

pub const REG_MODE: u16 = 0;
pub const REG_PKT_SENT: u16 = 10;
pub const REG_SEQ_LOW: u16 = 11;
pub const REG_SEQ_HIGH: u16 = 12;

/// Register map of the payload-generator firmware. Fixed at synthesis time.
pub const REGISTERS: [Register; 8] = [
    Register { addr: REG_MODE, name: "mode", writable: true, desc: "traffic mode, low 4 bits (see mode table)" },
    Register { addr: 1, name: "pkt_len_bytes", writable: true, desc: "UDP payload length in bytes" },
    Register { addr: 2, name: "ipg_cycles", writable: true, desc: "inter-packet gap in clock cycles" },
    Register { addr: 3, name: "total_packets", writable: true, desc: "0 = infinite" },
    Register { addr: 4, name: "reset_counters", writable: true, desc: "write any value to reset pkt_sent/seq_num" },
    Register { addr: REG_PKT_SENT, name: "pkt_sent", writable: false, desc: "packets transmitted" },
    Register { addr: REG_SEQ_LOW, name: "seq_num_low", writable: false, desc: "sequence number [31:0]" },
    Register { addr: REG_SEQ_HIGH, name: "seq_num_high", writable: false, desc: "sequence number [63:32]" },
];

/// Traffic-generation modes, 4-bit codes.
pub const MODES: [(&str, u8); 10] = [
    ("idle", 0),
    ("hello", 1),
    ("inc64", 2),
    ("prbs31", 3),
    ("stability", 4),
    ("sweep", 5),
    ("random_gap", 6),
    ("min_ipg", 7),
    ("jumbo", 8),
    ("tiny", 9),
];

pub fn by_name(name: &str) -> Option<&'static Register> {
    REGISTERS.iter().find(|r| r.name.eq_ignore_ascii_case(name))
}

pub fn by_addr(addr: u16) -> Option<&'static Register> {
    REGISTERS.iter().find(|r| r.addr == addr)
}

pub fn mode_code(name: &str) -> Option<u8> {
    MODES
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|&(_, c)| c)
}

pub fn mode_name(code: u8) -> Option<&'static str> {
    MODES.iter().find(|&&(_, c)| c == code).map(|&(n, _)| n)
}

/// Comma-separated list of valid mode names, for error messages.
pub fn mode_list() -> String {
    MODES.map(|(n, _)| n).join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn addrs_unique() {
        for (i, a) in REGISTERS.iter().enumerate() {
            for b in &REGISTERS[i + 1..] {
                assert_ne!(a.addr, b.addr);
            }
        }
    }

    #[test]
    fn lookups_case_insensitive() {
        assert_eq!(by_name("PKT_SENT").unwrap().addr, REG_PKT_SENT);
        assert!(by_name("no_such_reg").is_none());
        assert_eq!(mode_code("INC64"), Some(2));
        assert_eq!(mode_code("bogus"), None);
    }

    #[test]
    fn mode_table_bijective() {
        for (name, code) in MODES {
            assert!(code < 16, "mode field is 4 bits");
            assert_eq!(mode_name(code), Some(name));
            assert_eq!(mode_code(name), Some(code));
        }
        assert_eq!(mode_name(15), None);
    }
}
