use chrono::Timelike;
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::time::{Duration, Instant};

pub(crate) const TICK_INTERVAL: Duration = Duration::from_millis(1000);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct ClockDigits(pub(crate) [char; 6]);

impl ClockDigits {
    /// H H M M S S, 24-hour, zero padded.
    pub(crate) fn from_time<T: Timelike>(t: &T) -> Self {
        let digit = |v: u32| char::from_digit(v % 10, 10).unwrap_or('0');
        let (h, m, s) = (t.hour(), t.minute(), t.second().min(59));
        Self([
            digit(h / 10),
            digit(h),
            digit(m / 10),
            digit(m),
            digit(s / 10),
            digit(s),
        ])
    }

    /// Position (0 = last seconds digit, 5 = first hours digit) of the
    /// lowest non-zero digit. Every digit below it rolled over to zero on
    /// this tick, so it is the most significant one that changed.
    /// `00:00:00` rolled everything over and reports 5.
    pub(crate) fn most_significant_change(&self) -> usize {
        self.0
            .iter()
            .rev()
            .position(|&c| c != '0')
            .unwrap_or(self.0.len() - 1)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct ImpulseSpec {
    pub(crate) radius: usize,
    pub(crate) strength: f64,
}

pub(crate) const IMPULSE_TABLE: [ImpulseSpec; 6] = [
    ImpulseSpec {
        radius: 5,
        strength: 0.005,
    },
    ImpulseSpec {
        radius: 7,
        strength: 0.007,
    },
    ImpulseSpec {
        radius: 10,
        strength: 0.01,
    },
    ImpulseSpec {
        radius: 10,
        strength: 0.01,
    },
    ImpulseSpec {
        radius: 10,
        strength: 0.01,
    },
    ImpulseSpec {
        radius: 10,
        strength: 0.01,
    },
];

pub(crate) fn impulse_for(index: usize) -> ImpulseSpec {
    IMPULSE_TABLE[index.min(IMPULSE_TABLE.len() - 1)]
}

/// 1 Hz timer plus the random placement of each tick's impulse.
pub(crate) struct Ticker {
    rng: StdRng,
    next_at: Instant,
}

impl Ticker {
    pub(crate) fn new(seed: u64, now: Instant) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            next_at: now + TICK_INTERVAL,
        }
    }

    /// True once per elapsed interval. A long stall yields a single tick and
    /// the schedule restarts from `now`.
    pub(crate) fn due(&mut self, now: Instant) -> bool {
        if now < self.next_at {
            return false;
        }
        self.next_at += TICK_INTERVAL;
        if self.next_at <= now {
            self.next_at = now + TICK_INTERVAL;
        }
        true
    }

    pub(crate) fn until_next(&self, now: Instant) -> Duration {
        self.next_at.saturating_duration_since(now)
    }

    /// Uniform cell in `[0, len)` and a coin-flip sign.
    pub(crate) fn pluck(&mut self, spec: ImpulseSpec, len: usize) -> Option<(i64, f64)> {
        if len == 0 {
            return None;
        }
        let pos = self.rng.gen_range(0..len) as i64;
        let sign = if self.rng.gen_bool(0.5) { 1.0 } else { -1.0 };
        Some((pos, sign * spec.strength))
    }

    pub(crate) fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn at(h: u32, m: u32, s: u32) -> ClockDigits {
        let t = NaiveTime::from_hms_opt(h, m, s).expect("valid time");
        ClockDigits::from_time(&t)
    }

    #[test]
    fn digits_are_zero_padded() {
        assert_eq!(at(7, 5, 9).0, ['0', '7', '0', '5', '0', '9']);
        assert_eq!(at(23, 59, 41).0, ['2', '3', '5', '9', '4', '1']);
    }

    #[test]
    fn change_index_scans_from_seconds_upward() {
        assert_eq!(at(12, 34, 57).most_significant_change(), 0);
        assert_eq!(at(12, 34, 50).most_significant_change(), 1);
        assert_eq!(at(12, 34, 0).most_significant_change(), 2);
        assert_eq!(at(12, 30, 0).most_significant_change(), 3);
        assert_eq!(at(12, 0, 0).most_significant_change(), 4);
        assert_eq!(at(10, 0, 0).most_significant_change(), 5);
        assert_eq!(at(0, 0, 0).most_significant_change(), 5);
    }

    #[test]
    fn impulse_table_ends() {
        assert_eq!(impulse_for(0), ImpulseSpec { radius: 5, strength: 0.005 });
        assert_eq!(impulse_for(1), ImpulseSpec { radius: 7, strength: 0.007 });
        assert_eq!(impulse_for(5), ImpulseSpec { radius: 10, strength: 0.01 });
        assert_eq!(impulse_for(42), impulse_for(5));
    }

    #[test]
    fn ticker_fires_once_per_interval() {
        let t0 = Instant::now();
        let mut t = Ticker::new(1, t0);
        assert!(!t.due(t0));
        assert!(!t.due(t0 + Duration::from_millis(999)));
        assert!(t.due(t0 + Duration::from_millis(1000)));
        assert!(!t.due(t0 + Duration::from_millis(1500)));
        assert!(t.due(t0 + Duration::from_millis(2001)));

        // a ten second stall produces one tick, not ten
        let late = t0 + Duration::from_secs(12);
        assert!(t.due(late));
        assert!(!t.due(late + Duration::from_millis(10)));
        assert_eq!(t.until_next(late), TICK_INTERVAL);
    }

    #[test]
    fn pluck_stays_on_line_and_flips_sign() {
        let mut t = Ticker::new(7, Instant::now());
        let spec = impulse_for(3);
        assert_eq!(t.pluck(spec, 0), None);

        let mut ups = 0;
        for _ in 0..200 {
            let (pos, strength) = t.pluck(spec, 13).expect("non-empty line");
            assert!((0..13).contains(&pos));
            assert_eq!(strength.abs(), spec.strength);
            if strength > 0.0 {
                ups += 1;
            }
        }
        assert!(ups > 0 && ups < 200);
    }
}
