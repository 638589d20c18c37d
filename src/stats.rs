use std::time::Instant;

/// Send-side counters with periodic rate printing, for the flooder.
#[derive(Debug, Clone)]
pub struct TxStats {
    pub sent: u64,
    pub bytes: u64,
    window_pkts: u64,
    window_bytes: u64,
    last: Instant,
}

impl TxStats {
    pub fn new() -> Self {
        Self {
            sent: 0,
            bytes: 0,
            window_pkts: 0,
            window_bytes: 0,
            last: Instant::now(),
        }
    }

    pub fn add(&mut self, n: usize) {
        self.sent += 1;
        self.bytes += n as u64;
        self.window_pkts += 1;
        self.window_bytes += n as u64;
    }

    pub fn maybe_print(&mut self, stats_int: f64) {
        let dur = self.last.elapsed().as_secs_f64();
        if dur >= stats_int {
            let dur = dur.max(1e-3);
            eprintln!(
                "[flood] sent={} bytes={} => {:.0} pkt/s, {:.1} kB/s",
                self.sent,
                self.bytes,
                (self.window_pkts as f64) / dur,
                (self.window_bytes as f64) / dur / 1000.0,
            );
            self.window_pkts = 0;
            self.window_bytes = 0;
            self.last = Instant::now();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate() {
        let mut s = TxStats::new();
        s.add(12);
        s.add(12);
        s.add(1472);
        assert_eq!(s.sent, 3);
        assert_eq!(s.bytes, 1496);
    }
}
