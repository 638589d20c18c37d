use std::io::ErrorKind;
use std::net::{SocketAddr, UdpSocket};
use std::time::Duration;

use thiserror::Error;

/// Largest reply datagram we accept (one ethernet MTU).
const REPLY_BUF: usize = 1500;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("send failed: {0}")]
    SendFailed(#[source] std::io::Error),
    #[error("no reply within {0:?}")]
    Timeout(Duration),
}

/// Datagram exchange with the device. Stateless between calls; no assumption
/// about reply ordering across calls.
pub trait Transport {
    /// Fire-and-forget. Write requests are not acknowledged by the firmware;
    /// the client confirms them by reading back.
    fn send(&self, frame: &[u8]) -> Result<(), TransportError>;

    /// One request datagram out, at most one reply datagram back.
    fn send_and_wait(&self, frame: &[u8], timeout: Duration) -> Result<Vec<u8>, TransportError>;
}

/// Blocking UDP exchange with the device. A fresh ephemeral socket per call,
/// dropped on every exit path, so a stale reply from a previous call can
/// never be picked up.
#[derive(Debug, Clone)]
pub struct UdpTransport {
    device: SocketAddr,
}

impl UdpTransport {
    pub fn new(device: SocketAddr) -> Self {
        Self { device }
    }
}

impl Transport for UdpTransport {
    fn send(&self, frame: &[u8]) -> Result<(), TransportError> {
        let sock = UdpSocket::bind(("0.0.0.0", 0)).map_err(TransportError::SendFailed)?;
        sock.send_to(frame, self.device)
            .map_err(TransportError::SendFailed)?;
        Ok(())
    }

    fn send_and_wait(&self, frame: &[u8], timeout: Duration) -> Result<Vec<u8>, TransportError> {
        let sock = UdpSocket::bind(("0.0.0.0", 0)).map_err(TransportError::SendFailed)?;
        sock.set_read_timeout(Some(timeout))
            .map_err(TransportError::SendFailed)?;
        sock.send_to(frame, self.device)
            .map_err(TransportError::SendFailed)?;

        let mut buf = [0u8; REPLY_BUF];
        match sock.recv_from(&mut buf) {
            Ok((n, _)) => Ok(buf[..n].to_vec()),
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                Err(TransportError::Timeout(timeout))
            }
            // no finer-grained cause is distinguished; treat as a send-layer fault
            Err(e) => Err(TransportError::SendFailed(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    fn local_sock() -> (UdpSocket, SocketAddr) {
        let sock = UdpSocket::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();
        let addr = sock.local_addr().unwrap();
        (sock, addr)
    }

    #[test]
    fn round_trip_on_loopback() {
        let (dev, addr) = local_sock();
        let echo = std::thread::spawn(move || {
            let mut buf = [0u8; 64];
            let (n, peer) = dev.recv_from(&mut buf).unwrap();
            dev.send_to(&buf[..n], peer).unwrap();
        });

        let t = UdpTransport::new(addr);
        let reply = t
            .send_and_wait(&[1, 2, 3, 4], Duration::from_secs(2))
            .unwrap();
        assert_eq!(reply, vec![1, 2, 3, 4]);
        echo.join().unwrap();
    }

    #[test]
    fn silent_peer_times_out() {
        // bound but never answering
        let (_dev, addr) = local_sock();
        let t = UdpTransport::new(addr);
        match t.send_and_wait(&[0xAA], Duration::from_millis(50)) {
            Err(TransportError::Timeout(_)) => {}
            other => panic!("expected timeout, got {other:?}"),
        }
    }
}
