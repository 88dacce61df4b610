use std::thread;
use std::time::Duration;

use crate::color::{Color, BLACK};
use crate::interpolation::StripState;
use crate::intervaltimer::IntervalTimer;
use crate::programstatus::ProgramStatus;
use crate::sink::DeviceSink;
use crate::taskqueue::TaskQueue;

// While the sink stays down, only every this many failed frames is logged.
const FAILURE_LOG_EVERY: u64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interrupted;

/// Everything a program may touch while it runs: the pixel buffer, the sink
/// it is flushed to, and a read-only view of the task queue for checkpoints.
pub struct Stage {
    sink: Box<dyn DeviceSink>,
    pixels: Vec<Color>,
    queue: TaskQueue,
    status: ProgramStatus,
    timer: IntervalTimer,
    poll_every: u32,
    frames: u64,
    failed_frames: u64,
    failure_streak: u64,
}

impl Stage {
    pub fn new(
        sink: Box<dyn DeviceSink>,
        queue: TaskQueue,
        status: ProgramStatus,
        timer: IntervalTimer,
        poll_every: u32,
    ) -> Stage {
        let pixels = vec![BLACK; sink.pixel_count()];
        Stage {
            sink,
            pixels,
            queue,
            status,
            timer,
            poll_every: poll_every.max(1),
            frames: 0,
            failed_frames: 0,
            failure_streak: 0,
        }
    }

    pub fn pixel_count(&self) -> usize {
        self.pixels.len()
    }

    #[cfg(test)]
    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    pub fn fill(&mut self, color: Color) {
        self.pixels.fill(color);
    }

    pub fn render(&mut self, state: StripState) {
        state.render(&mut self.pixels);
    }

    pub fn frames_for(&self, duration: Duration) -> u32 {
        self.timer.ticks_for(duration)
    }

    pub(crate) fn begin(&mut self, name: &'static str) {
        self.status.publish(name);
        self.frames = 0;
        self.timer.reset();
    }

    /// Show the current buffer, wait for the next frame slot and, at every
    /// polling checkpoint, yield if a task is waiting.
    pub fn present(&mut self) -> Result<(), Interrupted> {
        self.flush();
        self.timer.sleep_until_next_tick();
        self.frames += 1;

        if self.frames % u64::from(self.poll_every) == 0 {
            self.checkpoint()
        } else {
            Ok(())
        }
    }

    pub fn checkpoint(&self) -> Result<(), Interrupted> {
        if self.queue.has_pending() {
            Err(Interrupted)
        } else {
            Ok(())
        }
    }

    /// Send a few black frames so an interrupted program never leaves the
    /// strip frozen mid-color. Not interruptible.
    pub(crate) fn quit_pulse(&mut self, frames: u32, interval: Duration) {
        self.status.publish("quit_blackout");
        self.fill(BLACK);
        for _ in 0..frames {
            self.flush();
            thread::sleep(interval);
        }
    }

    fn flush(&mut self) {
        for (index, color) in self.pixels.iter().enumerate() {
            self.sink.set_pixel(index, *color);
        }

        // A lost frame is invisible; the next one overwrites it anyway.
        match self.sink.show() {
            Ok(()) => {
                if self.failure_streak > 0 {
                    log::info!("Output recovered after {} failed frame(s)", self.failure_streak);
                    self.failure_streak = 0;
                }
            }
            Err(err) => {
                self.failed_frames += 1;
                self.failure_streak += 1;
                if is_reported_failure(self.failure_streak) {
                    log::warn!(
                        "Frame {} not shown ({} in a row, {} failed so far): {}",
                        self.frames,
                        self.failure_streak,
                        self.failed_frames,
                        err
                    );
                }
            }
        }
    }
}

fn is_reported_failure(streak: u64) -> bool {
    streak == 1 || streak % FAILURE_LOG_EVERY == 0
}
