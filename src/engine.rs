use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::config::Config;
use crate::intervaltimer::IntervalTimer;
use crate::programs::blackout::Blackout;
use crate::programs::colorwash::ColorWash;
use crate::programs::singlecolor::SingleColor;
use crate::programs::sleepytime::SleepyTime;
use crate::programs::wakeup::Wakeup;
use crate::programs::LightingProgram;
use crate::programstatus::ProgramStatus;
use crate::sink::DeviceSink;
use crate::stage::{Interrupted, Stage};
use crate::task::Task;
use crate::taskqueue::TaskQueue;

#[derive(Debug, Clone)]
pub struct EngineOptions {
    pub frame_interval: Duration,
    pub poll_every_frames: u32,
    pub idle_interval: Duration,
    pub quit_pulse_frames: u32,
    pub quit_pulse_interval: Duration,
    pub measure_fps: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        EngineOptions {
            frame_interval: Duration::from_millis(100),
            poll_every_frames: 1,
            idle_interval: Duration::from_millis(50),
            quit_pulse_frames: 5,
            quit_pulse_interval: Duration::from_millis(50),
            measure_fps: false,
        }
    }
}

impl From<&Config> for EngineOptions {
    fn from(config: &Config) -> Self {
        EngineOptions {
            frame_interval: Duration::from_millis(config.frame_interval_ms),
            poll_every_frames: config.poll_every_frames,
            idle_interval: Duration::from_millis(config.idle_interval_ms),
            quit_pulse_frames: config.quit_pulse_frames,
            quit_pulse_interval: Duration::from_millis(config.quit_pulse_interval_ms),
            measure_fps: config.measure_fps,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    IdleDequeue,
    RunningProgram(&'static str),
    ShuttingDown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Idle,
    /// The program finished on its own and the resting blackout was queued.
    Completed(&'static str),
    Interrupted(&'static str),
    Shutdown,
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("cannot spawn engine thread: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("engine did not stop within {0:?}")]
    ShutdownTimeout(Duration),

    #[error("engine thread panicked")]
    Panicked,
}

/// The single writer to the strip. Runs one program at a time, switching
/// programs only at the checkpoints where the running one yields.
pub struct Engine {
    stage: Stage,
    queue: TaskQueue,
    status: ProgramStatus,
    options: EngineOptions,
    state: EngineState,
}

impl Engine {
    pub fn new(sink: Box<dyn DeviceSink>, options: EngineOptions) -> Engine {
        let queue = TaskQueue::new();
        let status = ProgramStatus::new();
        let timer = IntervalTimer::new(options.frame_interval, options.measure_fps);
        let stage = Stage::new(
            sink,
            queue.clone(),
            status.clone(),
            timer,
            options.poll_every_frames,
        );

        Engine {
            stage,
            queue,
            status,
            options,
            state: EngineState::IdleDequeue,
        }
    }

    pub fn handle(&self) -> EngineHandle {
        EngineHandle {
            queue: self.queue.clone(),
            status: self.status.clone(),
        }
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn step(&mut self) -> Step {
        let Some(task) = self.queue.try_dequeue() else {
            self.state = EngineState::IdleDequeue;
            thread::sleep(self.options.idle_interval);
            return Step::Idle;
        };

        let mut program: Box<dyn LightingProgram> = match task {
            Task::Blackout => Box::new(Blackout),
            Task::SingleColor(args) => Box::new(SingleColor::new(args)),
            Task::ChangingColor(args) => Box::new(ColorWash::new(args)),
            Task::Wakeup(args) => Box::new(Wakeup::new(args)),
            Task::SleepyTime(args) => Box::new(SleepyTime::new(args)),
            Task::Kill => {
                self.shut_down();
                return Step::Shutdown;
            }
        };

        let name = program.name();
        self.state = EngineState::RunningProgram(name);
        log::info!("Starting program: {}", name);
        self.stage.begin(name);

        let step = match program.run(&mut self.stage) {
            Ok(()) => {
                if self.queue.enqueue_if_empty(Task::Blackout) {
                    log::info!("Program {} completed, returning to blackout", name);
                } else {
                    log::info!("Program {} completed, next task already waiting", name);
                }
                Step::Completed(name)
            }
            Err(Interrupted) => {
                log::info!("Program {} interrupted", name);
                if program.pulse_on_interrupt() {
                    self.stage
                        .quit_pulse(self.options.quit_pulse_frames, self.options.quit_pulse_interval);
                }
                Step::Interrupted(name)
            }
        };

        self.state = EngineState::IdleDequeue;
        step
    }

    pub fn run(mut self) {
        while self.step() != Step::Shutdown {}
        log::info!("Engine stopped in state {:?}", self.state());
    }

    pub fn spawn(self) -> Result<EngineThread, EngineError> {
        let handle = self.handle();
        let (done_tx, done_rx) = mpsc::channel();

        let join = thread::Builder::new()
            .name("Engine".to_string())
            .spawn(move || {
                self.run();
                // The receiver may already have given up waiting.
                let _ = done_tx.send(());
            })?;

        Ok(EngineThread {
            handle,
            join,
            done: done_rx,
        })
    }

    fn shut_down(&mut self) {
        self.state = EngineState::ShuttingDown;
        log::info!("KILL received, shutting down engine");
        self.stage
            .quit_pulse(self.options.quit_pulse_frames, self.options.quit_pulse_interval);
        self.status.clear();
        let dropped = self.queue.len();
        if dropped > 0 {
            log::info!("Dropping {} task(s) queued after KILL", dropped);
        }
    }
}

#[derive(Clone)]
pub struct EngineHandle {
    queue: TaskQueue,
    status: ProgramStatus,
}

impl EngineHandle {
    pub fn enqueue(&self, task: Task) {
        log::debug!("Enqueueing {} ({:?})", task.program(), task);
        self.queue.enqueue(task);
    }

    pub fn current_program(&self) -> &'static str {
        self.status.current()
    }
}

pub struct EngineThread {
    handle: EngineHandle,
    join: JoinHandle<()>,
    done: mpsc::Receiver<()>,
}

impl EngineThread {
    pub fn handle(&self) -> EngineHandle {
        self.handle.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Enqueue `KILL` and wait up to `timeout` for the engine to stop.
    pub fn shutdown(self, timeout: Duration) -> Result<(), EngineError> {
        self.handle.enqueue(Task::Kill);

        match self.done.recv_timeout(timeout) {
            // A disconnect without a message means the thread unwound.
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                self.join.join().map_err(|_| EngineError::Panicked)
            }
            Err(RecvTimeoutError::Timeout) => Err(EngineError::ShutdownTimeout(timeout)),
        }
    }
}
