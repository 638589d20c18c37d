use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use thiserror::Error;

use crate::frame::{DecodeError, decode_response, encode_request};
use crate::registers::{self, REG_MODE, REG_PKT_SENT, REG_SEQ_HIGH, REG_SEQ_LOW, Register};
use crate::transport::{Transport, TransportError};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error("unknown register: {0}")]
    UnknownRegister(String),
    #[error("register {0} is read-only")]
    ReadOnlyRegister(&'static str),
    #[error("unknown mode: {0} (valid: {1})")]
    UnknownMode(String, String),
    #[error("value must be an integer, got {0:?}")]
    InvalidValue(String),
}

/// Read-back schedule for verified writes. Only a timed-out probe is
/// retried; a wrong answer or a failed send is final.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub attempts: u32,
    /// Pause before each probe, giving the firmware time to latch the write.
    pub settle: Duration,
    /// Extra pause after a timed-out probe.
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            settle: Duration::from_millis(10),
            backoff: Duration::from_millis(20),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ClientConfig {
    /// Per-exchange reply timeout.
    pub reply_timeout: Duration,
    pub retry: RetryPolicy,
    /// Monitor polling interval.
    pub poll_interval: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            reply_timeout: Duration::from_millis(200),
            retry: RetryPolicy::default(),
            poll_interval: Duration::from_millis(200),
        }
    }
}

/// Terminal verdict of a write-then-verify.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Pass,
    Mismatch { expected: u32, actual: u32 },
    ReadbackTimeout,
}

/// Decoded register read, per address semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reading {
    Mode {
        raw: u32,
        code: u8,
        name: Option<&'static str>,
    },
    /// 64-bit sequence counter assembled from the low/high word pair.
    SeqCounter(u64),
    Raw(u32),
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Reading::Mode { raw, code, name } => {
                let name = name.map_or("UNKNOWN".to_string(), str::to_uppercase);
                write!(f, "0x{raw:08X} -> {name} (mode {code})")
            }
            Reading::SeqCounter(v) => write!(f, "{v} (0x{v:016X})"),
            Reading::Raw(v) => write!(f, "0x{v:08X} ({v})"),
        }
    }
}

/// Register-access client. Owns all retry/timeout policy; one blocking
/// exchange at a time, no state kept across operations.
pub struct RegisterClient<T: Transport> {
    transport: T,
    config: ClientConfig,
}

impl<T: Transport> RegisterClient<T> {
    pub fn new(transport: T, config: ClientConfig) -> Self {
        Self { transport, config }
    }

    /// One read exchange: request with value 0, decode the reply.
    pub fn read_raw(&self, addr: u16) -> Result<u32, ClientError> {
        let pkt = encode_request(addr, 0);
        let reply = self.transport.send_and_wait(&pkt, self.config.reply_timeout)?;
        Ok(decode_response(&reply)?)
    }

    /// Write `(addr, value)` then confirm by reading the address back.
    ///
    /// The write itself is unacknowledged, so the read-back is the only
    /// evidence it landed. Probes run on an attempt counter: sleep `settle`,
    /// read, and on timeout sleep `backoff` and try again. An answer is
    /// always conclusive — equal means `Pass`, unequal means `Mismatch` with
    /// no further probing.
    pub fn write_verified(&self, addr: u16, value: u64) -> Result<WriteOutcome, ClientError> {
        let expected = value as u32;
        self.transport.send(&encode_request(addr, expected))?;

        for _ in 0..self.config.retry.attempts {
            std::thread::sleep(self.config.retry.settle);
            match self.read_raw(addr) {
                Ok(actual) if actual == expected => return Ok(WriteOutcome::Pass),
                Ok(actual) => return Ok(WriteOutcome::Mismatch { expected, actual }),
                Err(ClientError::Transport(TransportError::Timeout(_))) => {
                    std::thread::sleep(self.config.retry.backoff);
                }
                Err(e) => return Err(e),
            }
        }
        Ok(WriteOutcome::ReadbackTimeout)
    }

    /// Read an address and decode it: mode register gets its symbolic name,
    /// either sequence word triggers a combined 64-bit read, everything else
    /// is returned raw.
    pub fn read_decoded(&self, addr: u16) -> Result<Reading, ClientError> {
        let raw = self.read_raw(addr)?;
        match addr {
            REG_MODE => {
                let code = (raw & 0xF) as u8;
                Ok(Reading::Mode {
                    raw,
                    code,
                    name: registers::mode_name(code),
                })
            }
            REG_SEQ_LOW | REG_SEQ_HIGH => {
                // Best effort: the two words are sampled at different
                // device-side instants, and a timed-out half counts as 0.
                let low = self.read_raw(REG_SEQ_LOW).unwrap_or(0) as u64;
                let high = self.read_raw(REG_SEQ_HIGH).unwrap_or(0) as u64;
                Ok(Reading::SeqCounter((high << 32) | low))
            }
            _ => Ok(Reading::Raw(raw)),
        }
    }

    /// Resolve a register name and read it. Unknown names never reach the
    /// network.
    pub fn read_by_name(&self, name: &str) -> Result<(&'static Register, Reading), ClientError> {
        let reg = registers::by_name(name)
            .ok_or_else(|| ClientError::UnknownRegister(name.to_string()))?;
        let reading = self.read_decoded(reg.addr)?;
        Ok((reg, reading))
    }

    /// Resolve a writable register name, parse the value, write-verify.
    /// All validation happens before any I/O.
    pub fn set_by_name(&self, name: &str, raw: &str) -> Result<WriteOutcome, ClientError> {
        let reg = registers::by_name(name)
            .ok_or_else(|| ClientError::UnknownRegister(name.to_string()))?;
        if !reg.writable {
            return Err(ClientError::ReadOnlyRegister(reg.name));
        }
        let value: u64 = raw
            .parse()
            .map_err(|_| ClientError::InvalidValue(raw.to_string()))?;
        self.write_verified(reg.addr, value)
    }

    /// Resolve a mode name (case-insensitive) and write it to the mode
    /// register. An unknown name fails without network I/O.
    pub fn set_mode(&self, name: &str) -> Result<WriteOutcome, ClientError> {
        let code = registers::mode_code(name)
            .ok_or_else(|| ClientError::UnknownMode(name.to_string(), registers::mode_list()))?;
        self.write_verified(REG_MODE, code as u64)
    }

    /// Poll pkt_sent until `stop` is set, reporting each value that comes
    /// back. Failed reads are skipped, not escalated; the flag is checked
    /// once per iteration, so cancellation lags by at most one poll.
    pub fn monitor(&self, stop: &AtomicBool, mut report: impl FnMut(u32)) {
        while !stop.load(Ordering::Relaxed) {
            if let Ok(v) = self.read_raw(REG_PKT_SENT) {
                report(v);
            }
            std::thread::sleep(self.config.poll_interval);
        }
    }
}
