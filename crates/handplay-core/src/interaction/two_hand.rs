//! Both-hands pinch detection

use std::time::Duration;

/// Fires when both hands start pinching together, at most once per cooldown
#[derive(Debug, Clone)]
pub struct TwoHandPinchDetector {
    cooldown: Duration,
    was_both: bool,
    last_fired: Option<Duration>,
}

impl TwoHandPinchDetector {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            was_both: false,
            last_fired: None,
        }
    }

    /// Feed whether both hands are pinching at `now`
    pub fn update(&mut self, both_pinching: bool, now: Duration) -> bool {
        let rising = both_pinching && !self.was_both;
        self.was_both = both_pinching;
        if !rising {
            return false;
        }
        let cooled = self
            .last_fired
            .map(|t| now.saturating_sub(t) >= self.cooldown)
            .unwrap_or(true);
        if cooled {
            self.last_fired = Some(now);
        }
        cooled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn test_fires_on_rising_edge_only() {
        let mut d = TwoHandPinchDetector::new(ms(1000));
        assert!(!d.update(false, ms(0)));
        assert!(d.update(true, ms(16)));
        assert!(!d.update(true, ms(32)));
    }

    #[test]
    fn test_cooldown_suppresses_repeat() {
        let mut d = TwoHandPinchDetector::new(ms(1000));
        assert!(d.update(true, ms(0)));
        d.update(false, ms(100));
        assert!(!d.update(true, ms(500)));
        d.update(false, ms(900));
        assert!(d.update(true, ms(1200)));
    }
}
