use std::thread;
use std::time::{Duration, Instant};

/// Paces a loop at a fixed interval. A tick that overruns its slot is not
/// dropped; the next slot simply starts late.
pub struct IntervalTimer {
    interval: Duration,
    last_tick: Instant,
    thread_name: String,
    measure_fps: bool,
    last_fps_print: Instant,
    frames: u32,
}

impl IntervalTimer {
    pub fn new(interval: Duration, measure_fps: bool) -> IntervalTimer {
        let cur_thread = thread::current();
        let thread_name = cur_thread.name().unwrap_or("unnamed");

        IntervalTimer {
            interval,
            last_tick: Instant::now(),
            thread_name: thread_name.to_string(),
            measure_fps,
            last_fps_print: Instant::now(),
            frames: 0,
        }
    }

    pub fn reset(&mut self) {
        // The timer may have been built on another thread than it runs on.
        self.thread_name = thread::current().name().unwrap_or("unnamed").to_string();
        self.last_tick = Instant::now();
    }

    pub fn sleep_until_next_tick(&mut self) {
        if self.measure_fps {
            self.update_fps();
        }

        if self.interval.is_zero() {
            self.last_tick = Instant::now();
            return;
        }

        let now = Instant::now();
        let next_tick = if self.last_tick + self.interval > now {
            self.last_tick + self.interval
        } else {
            log::warn!("{} overran its frame interval", self.thread_name);
            now + self.interval
        };

        thread::sleep(next_tick.saturating_duration_since(Instant::now()));
        self.last_tick = next_tick;
    }

    /// Number of ticks that fit into `duration`, rounded to the nearest tick.
    /// A zero interval counts every millisecond as one tick.
    pub fn ticks_for(&self, duration: Duration) -> u32 {
        let ticks = if self.interval.is_zero() {
            duration.as_millis() as f64
        } else {
            (duration.as_secs_f64() / self.interval.as_secs_f64()).round()
        };
        ticks.min(f64::from(u32::MAX)) as u32
    }

    fn update_fps(&mut self) {
        self.frames += 1;

        if Instant::now() - self.last_fps_print > Duration::from_secs(1) {
            log::debug!("{} FPS: {}", self.thread_name, self.frames);
            self.frames = 0;
            self.last_fps_print = Instant::now();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticks_for_rounds_to_nearest_tick() {
        let timer = IntervalTimer::new(Duration::from_millis(100), false);
        assert_eq!(timer.ticks_for(Duration::from_millis(0)), 0);
        assert_eq!(timer.ticks_for(Duration::from_millis(40)), 0);
        assert_eq!(timer.ticks_for(Duration::from_millis(50)), 1);
        assert_eq!(timer.ticks_for(Duration::from_millis(2000)), 20);
    }

    #[test]
    fn zero_interval_counts_milliseconds() {
        let timer = IntervalTimer::new(Duration::ZERO, false);
        assert_eq!(timer.ticks_for(Duration::from_millis(250)), 250);
    }

    #[test]
    fn sleeps_roughly_one_interval() {
        let mut timer = IntervalTimer::new(Duration::from_millis(20), false);
        timer.reset();
        let start = Instant::now();
        timer.sleep_until_next_tick();
        timer.sleep_until_next_tick();
        assert!(start.elapsed() >= Duration::from_millis(35));
    }
}
