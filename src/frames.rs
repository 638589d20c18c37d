use std::net::Ipv4Addr;

use anyhow::{Context, Result, bail};

use crate::cli::GenFramesOpts;

/// Addressing for the synthesized reply frames.
#[derive(Debug, Clone, Copy)]
pub struct FrameConfig {
    pub src_mac: [u8; 6],
    pub dst_mac: [u8; 6],
    pub src_ip: Ipv4Addr,
    pub dst_ip: Ipv4Addr,
    pub src_port: u16,
    pub dst_port: u16,
}

/// Generate a file of complete Ethernet II + IPv4 + UDP frames for offline
/// testbench playback. Consumes nothing from the register protocol.
pub fn run(opts: GenFramesOpts) -> Result<()> {
    let cfg = FrameConfig {
        src_mac: parse_mac(&opts.src_mac)?,
        dst_mac: parse_mac(&opts.dst_mac)?,
        src_ip: opts.src_ip,
        dst_ip: opts.dst_ip,
        src_port: opts.src_port,
        dst_port: opts.dst_port,
    };

    let mut out = Vec::new();
    for i in 0..opts.frames {
        let payload = pattern_payload(i, opts.len_base + i as usize * opts.len_step);
        out.extend_from_slice(&build_reply_frame(&cfg, &payload));
    }
    std::fs::write(&opts.out, &out)
        .with_context(|| format!("writing {}", opts.out.display()))?;

    eprintln!(
        "[gen-frames] wrote {} frames ({} bytes) to {}",
        opts.frames,
        out.len(),
        opts.out.display()
    );
    Ok(())
}

pub fn parse_mac(s: &str) -> Result<[u8; 6]> {
    let parts: Vec<&str> = s.split(':').collect();
    if parts.len() != 6 {
        bail!("mac must be six ':'-separated hex octets, got {s:?}");
    }
    let mut mac = [0u8; 6];
    for (i, p) in parts.iter().enumerate() {
        mac[i] =
            u8::from_str_radix(p, 16).with_context(|| format!("bad octet {p:?} in mac {s:?}"))?;
    }
    Ok(mac)
}

/// Payload bytes follow the (offset + frame index) & 0xFF ramp, so the
/// testbench can spot truncation or reordering at a glance.
fn pattern_payload(seq: u64, len: usize) -> Vec<u8> {
    (0..len).map(|i| ((i as u64 + seq) & 0xFF) as u8).collect()
}

/// RFC 1071 ones-complement sum over `data`, folded to 16 bits. A trailing
/// odd byte is zero-padded on the right.
pub fn inet_checksum(data: &[u8]) -> u16 {
    let mut sum: u32 = 0;
    let mut chunks = data.chunks_exact(2);
    for c in &mut chunks {
        sum += u32::from(u16::from_be_bytes([c[0], c[1]]));
        sum = (sum & 0xFFFF) + (sum >> 16);
    }
    if let [b] = chunks.remainder() {
        sum += u32::from(*b) << 8;
        sum = (sum & 0xFFFF) + (sum >> 16);
    }
    !(sum as u16)
}

/// UDP checksum over the IPv4 pseudo-header, UDP header (checksum field
/// zeroed) and payload.
fn udp_checksum(cfg: &FrameConfig, udp_hdr: &[u8; 8], payload: &[u8]) -> u16 {
    let mut buf = Vec::with_capacity(12 + 8 + payload.len());
    buf.extend_from_slice(&cfg.src_ip.octets());
    buf.extend_from_slice(&cfg.dst_ip.octets());
    buf.push(0);
    buf.push(17); // UDP
    buf.extend_from_slice(&((8 + payload.len()) as u16).to_be_bytes());
    buf.extend_from_slice(&udp_hdr[..6]);
    buf.extend_from_slice(&[0, 0]);
    buf.extend_from_slice(payload);
    inet_checksum(&buf)
}

/// One complete frame: MAC + IP + UDP + payload, zero-padded to a 64-bit
/// boundary as the MAC receive path expects.
pub fn build_reply_frame(cfg: &FrameConfig, payload: &[u8]) -> Vec<u8> {
    let udp_len = (8 + payload.len()) as u16;
    let mut udp = [0u8; 8];
    udp[0..2].copy_from_slice(&cfg.src_port.to_be_bytes());
    udp[2..4].copy_from_slice(&cfg.dst_port.to_be_bytes());
    udp[4..6].copy_from_slice(&udp_len.to_be_bytes());
    let udp_chk = udp_checksum(cfg, &udp, payload);
    udp[6..8].copy_from_slice(&udp_chk.to_be_bytes());

    let total_len = 20 + udp_len;
    let mut ip = [0u8; 20];
    ip[0] = 0x45; // v4, 20-byte header
    ip[2..4].copy_from_slice(&total_len.to_be_bytes());
    ip[6..8].copy_from_slice(&0x4000u16.to_be_bytes()); // don't fragment
    ip[8] = 64; // ttl
    ip[9] = 17; // UDP
    ip[12..16].copy_from_slice(&cfg.src_ip.octets());
    ip[16..20].copy_from_slice(&cfg.dst_ip.octets());
    let ip_chk = inet_checksum(&ip);
    ip[10..12].copy_from_slice(&ip_chk.to_be_bytes());

    let mut frame = Vec::with_capacity(14 + 20 + 8 + payload.len() + 7);
    frame.extend_from_slice(&cfg.dst_mac);
    frame.extend_from_slice(&cfg.src_mac);
    frame.extend_from_slice(&0x0800u16.to_be_bytes()); // IPv4
    frame.extend_from_slice(&ip);
    frame.extend_from_slice(&udp);
    frame.extend_from_slice(payload);
    while frame.len() % 8 != 0 {
        frame.push(0);
    }
    frame
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_cfg() -> FrameConfig {
        FrameConfig {
            src_mac: [0xAC, 0x70, 0x12, 0x56, 0x41, 0x23],
            dst_mac: [0xAC, 0x14, 0x45, 0xFF, 0xAF, 0xC4],
            src_ip: Ipv4Addr::new(192, 168, 1, 149),
            dst_ip: Ipv4Addr::new(192, 168, 1, 144),
            src_port: 0x4554,
            dst_port: 0x8080,
        }
    }

    #[test]
    fn inet_checksum_known_header() {
        // the classic IPv4 header checksum example
        let hdr = [
            0x45, 0x00, 0x00, 0x73, 0x00, 0x00, 0x40, 0x00, 0x40, 0x11, 0x00, 0x00, 0xC0, 0xA8,
            0x00, 0x01, 0xC0, 0xA8, 0x00, 0xC7,
        ];
        assert_eq!(inet_checksum(&hdr), 0xB861);
    }

    #[test]
    fn ip_header_verifies_after_insertion() {
        let frame = build_reply_frame(&test_cfg(), b"hello fpga");
        // with the checksum field filled in, the ones-complement sum is 0
        assert_eq!(inet_checksum(&frame[14..34]), 0);
    }

    #[test]
    fn frame_layout_and_alignment() {
        let cfg = test_cfg();
        for len in [1usize, 8, 13, 64, 113] {
            let payload = pattern_payload(3, len);
            let frame = build_reply_frame(&cfg, &payload);
            assert_eq!(frame.len() % 8, 0, "frames must be 64-bit aligned");
            assert_eq!(&frame[0..6], &cfg.dst_mac);
            assert_eq!(&frame[6..12], &cfg.src_mac);
            assert_eq!(&frame[12..14], &[0x08, 0x00]);
            assert_eq!(frame[23], 17, "ip protocol must be UDP");
            let udp_len = u16::from_be_bytes([frame[38], frame[39]]);
            assert_eq!(udp_len as usize, 8 + len);
            assert_eq!(&frame[42..42 + len], &payload[..]);
        }
    }

    #[test]
    fn parse_mac_roundtrip() {
        assert_eq!(
            parse_mac("AC:70:12:56:41:23").unwrap(),
            [0xAC, 0x70, 0x12, 0x56, 0x41, 0x23]
        );
        assert!(parse_mac("AC:70:12:56:41").is_err());
        assert!(parse_mac("AC:70:12:56:41:GG").is_err());
    }
}
