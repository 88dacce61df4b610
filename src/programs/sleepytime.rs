use crate::interpolation::Keyframe;
use crate::programs::{walk_keyframes, LightingProgram};
use crate::stage::{Interrupted, Stage};
use crate::task::MultiplierArgs;

const BASE_MULTIPLIER: u32 = 60;

const WIND_DOWN: [Keyframe; 2] = [
    Keyframe::new(30, 2, 0, 100, 1), // dim red
    Keyframe::new(0, 0, 0, 0, 0),    // black
];

pub struct SleepyTime {
    multiplier: u32,
}

impl SleepyTime {
    pub fn new(args: MultiplierArgs) -> SleepyTime {
        SleepyTime {
            multiplier: args.multiplier.max(1),
        }
    }
}

impl LightingProgram for SleepyTime {
    fn name(&self) -> &'static str {
        "sleepy_time"
    }

    fn run(&mut self, stage: &mut Stage) -> Result<(), Interrupted> {
        log::info!("Winding down with multiplier={}", self.multiplier);
        walk_keyframes(stage, &WIND_DOWN, BASE_MULTIPLIER, self.multiplier)
    }
}
