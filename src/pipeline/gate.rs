use std::time::{Duration, Instant};

/// Drops frames that arrive sooner than `min_interval` after the last
/// admitted one. Nothing is queued.
#[derive(Debug, Clone)]
pub struct ThrottleGate {
    min_interval: Duration,
    last_processed: Option<Instant>,
}

impl ThrottleGate {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_processed: None,
        }
    }

    /// Whether a frame arriving at `now` would pass the gate
    pub fn is_open(&self, now: Instant) -> bool {
        match self.last_processed {
            Some(last) => now.saturating_duration_since(last) >= self.min_interval,
            None => true,
        }
    }

    /// Record `now` as the last processed time
    pub fn mark(&mut self, now: Instant) {
        self.last_processed = Some(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate() -> ThrottleGate {
        ThrottleGate::new(Duration::from_millis(250))
    }

    #[test]
    fn first_frame_is_admitted() {
        assert!(gate().is_open(Instant::now()));
    }

    #[test]
    fn frames_100ms_apart_are_throttled() {
        let mut gate = gate();
        let t0 = Instant::now();
        gate.mark(t0);
        assert!(!gate.is_open(t0 + Duration::from_millis(100)));
    }

    #[test]
    fn frames_300ms_apart_are_admitted() {
        let mut gate = gate();
        let t0 = Instant::now();
        gate.mark(t0);
        assert!(gate.is_open(t0 + Duration::from_millis(300)));
    }

    #[test]
    fn checking_does_not_reset_the_window() {
        let mut gate = gate();
        let t0 = Instant::now();
        gate.mark(t0);
        assert!(!gate.is_open(t0 + Duration::from_millis(200)));
        assert!(gate.is_open(t0 + Duration::from_millis(250)));
    }

    #[test]
    fn mark_moves_the_window() {
        let mut gate = gate();
        let t0 = Instant::now();
        gate.mark(t0);
        gate.mark(t0 + Duration::from_millis(250));
        assert!(!gate.is_open(t0 + Duration::from_millis(400)));
        assert!(gate.is_open(t0 + Duration::from_millis(500)));
    }
}
