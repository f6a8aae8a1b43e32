// ── Frame clock ───────────────────────────────────────────────────────────────
//
// `double_time()` is seconds since the first call, as an f64.  Two sources:
//   • `HighResolution` — monotonic `Instant` (performance counter on Windows);
//   • `CoarseMillis`   — a 32-bit millisecond tick that wraps every ~49.7
//                        days, selected by `-nohwtimer`.

use std::time::Instant;

/// Where the clock reads time from.
pub trait TimeSource {
    /// Seconds elapsed since `origin` was taken.
    fn elapsed_since(&self, origin: &Reading) -> f64;
    fn now(&self) -> Reading;
}

/// A raw sample from a [`TimeSource`].
#[derive(Debug, Clone, Copy)]
pub enum Reading {
    Instant(Instant),
    Millis(u32),
}

/// Monotonic, sub-microsecond resolution.
#[derive(Debug, Default)]
pub struct HighResolution;

impl TimeSource for HighResolution {
    fn now(&self) -> Reading {
        Reading::Instant(Instant::now())
    }

    fn elapsed_since(&self, origin: &Reading) -> f64 {
        match origin {
            Reading::Instant(t) => t.elapsed().as_secs_f64(),
            Reading::Millis(_) => 0.0,
        }
    }
}

/// Millisecond tick counter truncated to 32 bits, like `timeGetTime`.
#[derive(Debug)]
pub struct CoarseMillis {
    base: Instant,
}

impl CoarseMillis {
    pub fn new() -> Self {
        Self { base: Instant::now() }
    }
}

impl Default for CoarseMillis {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for CoarseMillis {
    fn now(&self) -> Reading {
        // Truncation is the point: this source wraps like the OS tick does.
        Reading::Millis(self.base.elapsed().as_millis() as u32)
    }

    fn elapsed_since(&self, origin: &Reading) -> f64 {
        match (origin, self.now()) {
            (Reading::Millis(start), Reading::Millis(now)) => millis_between(*start, now),
            _ => 0.0,
        }
    }
}

/// Seconds from `start` to `now` on a wrapping 32-bit millisecond counter.
pub(crate) fn millis_between(start: u32, now: u32) -> f64 {
    f64::from(now.wrapping_sub(start)) / 1000.0
}

/// Elapsed-time clock anchored at its first reading.
pub struct Clock {
    source: Box<dyn TimeSource>,
    origin: Option<Reading>,
}

impl Clock {
    pub fn new(source: Box<dyn TimeSource>) -> Self {
        Self {
            source,
            origin: None,
        }
    }

    /// Pick the source from the command line: `-nohwtimer` forces the coarse
    /// millisecond tick.
    pub fn for_args(no_hw_timer: bool) -> Self {
        if no_hw_timer {
            log::info!("hardware timer disabled, using millisecond tick");
            Self::new(Box::new(CoarseMillis::new()))
        } else {
            Self::new(Box::new(HighResolution))
        }
    }

    /// Seconds since the first call; the first call returns exactly `0.0`.
    pub fn double_time(&mut self) -> f64 {
        match &self.origin {
            Some(origin) => self.source.elapsed_since(origin),
            None => {
                self.origin = Some(self.source.now());
                0.0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    /// Millisecond source driven by the test.
    struct Manual(Rc<Cell<u32>>);

    impl TimeSource for Manual {
        fn now(&self) -> Reading {
            Reading::Millis(self.0.get())
        }
        fn elapsed_since(&self, origin: &Reading) -> f64 {
            match origin {
                Reading::Millis(start) => millis_between(*start, self.0.get()),
                Reading::Instant(_) => 0.0,
            }
        }
    }

    #[test]
    fn first_call_is_zero_then_relative() {
        let tick = Rc::new(Cell::new(5_000));
        let mut clock = Clock::new(Box::new(Manual(tick.clone())));
        assert_eq!(clock.double_time(), 0.0);

        tick.set(6_500);
        assert_eq!(clock.double_time(), 1.5);
    }

    #[test]
    fn coarse_tick_survives_wraparound() {
        let tick = Rc::new(Cell::new(u32::MAX - 499));
        let mut clock = Clock::new(Box::new(Manual(tick.clone())));
        clock.double_time();

        tick.set(1_500);
        assert_eq!(clock.double_time(), 2.0);
    }

    #[test]
    fn high_resolution_is_monotonic() {
        let mut clock = Clock::for_args(false);
        assert_eq!(clock.double_time(), 0.0);
        let a = clock.double_time();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let b = clock.double_time();
        assert!(b > a);
        assert!(b >= 0.002);
    }
}
