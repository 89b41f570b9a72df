//! Settling of container resize observations

use std::time::{Duration, Instant};

/// Holds the latest observed container height until it has been stable for
/// `delay`, then releases it once.
#[derive(Debug, Clone)]
pub struct ResizeDebouncer {
    delay: Duration,
    applied: Option<f32>,
    pending: Option<(f32, Instant)>,
}

impl ResizeDebouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            applied: None,
            pending: None,
        }
    }

    /// Record a height seen this frame. Repeating the current value is free.
    pub fn observe(&mut self, height: f32, now: Instant) {
        if !height.is_finite() {
            return;
        }
        match self.pending {
            Some((pending, _)) if pending == height => {}
            _ if self.pending.is_none() && self.applied == Some(height) => {}
            _ => self.pending = Some((height, now)),
        }
    }

    /// Height to apply, if one has settled
    pub fn poll(&mut self, now: Instant) -> Option<f32> {
        let (height, since) = self.pending?;
        if now.duration_since(since) < self.delay {
            return None;
        }
        self.pending = None;
        if self.applied == Some(height) {
            return None;
        }
        self.applied = Some(height);
        Some(height)
    }

    /// Time left before the pending height settles, for scheduling a repaint
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.pending
            .map(|(_, since)| self.delay.saturating_sub(now.duration_since(since)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settles_after_delay() {
        let t0 = Instant::now();
        let mut d = ResizeDebouncer::new(Duration::from_millis(100));
        d.observe(600.0, t0);
        assert_eq!(d.poll(t0 + Duration::from_millis(50)), None);
        assert_eq!(d.poll(t0 + Duration::from_millis(100)), Some(600.0));
        assert_eq!(d.poll(t0 + Duration::from_millis(300)), None);
    }

    #[test]
    fn test_new_height_restarts_timer() {
        let t0 = Instant::now();
        let mut d = ResizeDebouncer::new(Duration::from_millis(100));
        d.observe(600.0, t0);
        d.observe(640.0, t0 + Duration::from_millis(80));
        assert_eq!(d.poll(t0 + Duration::from_millis(120)), None);
        assert_eq!(
            d.remaining(t0 + Duration::from_millis(120)),
            Some(Duration::from_millis(60))
        );
        assert_eq!(d.poll(t0 + Duration::from_millis(180)), Some(640.0));
    }

    #[test]
    fn test_unchanged_height_not_reported() {
        let t0 = Instant::now();
        let mut d = ResizeDebouncer::new(Duration::from_millis(100));
        d.observe(600.0, t0);
        assert_eq!(d.poll(t0 + Duration::from_millis(100)), Some(600.0));
        d.observe(600.0, t0 + Duration::from_millis(200));
        assert_eq!(d.remaining(t0 + Duration::from_millis(200)), None);
        assert_eq!(d.poll(t0 + Duration::from_millis(400)), None);
    }
}
