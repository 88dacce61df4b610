use crate::interpolation::Keyframe;
use crate::programs::{walk_keyframes, LightingProgram};
use crate::stage::{Interrupted, Stage};
use crate::task::MultiplierArgs;

const BASE_MULTIPLIER: u32 = 60;

// r, g, b, lit percent, weight of the segment towards the next keyframe
const SUNRISE: [Keyframe; 10] = [
    Keyframe::new(0, 0, 0, 10, 1),        // black
    Keyframe::new(0, 0, 10, 15, 1),       // dark blue
    Keyframe::new(2, 0, 15, 20, 1),       // purple
    Keyframe::new(7, 0, 10, 25, 1),       // reddish purple
    Keyframe::new(20, 1, 0, 30, 1),       // blood orange
    Keyframe::new(50, 6, 0, 40, 1),       // orange
    Keyframe::new(70, 15, 0, 50, 1),      // yellow
    Keyframe::new(70, 15, 2, 60, 2),      // warm white
    Keyframe::new(255, 200, 100, 100, 5), // white
    Keyframe::new(255, 200, 100, 100, 0), // white
];

/// Sunrise simulation: color, brightness and lit extent grow together. Full
/// brightness arrives after roughly `multiplier` minutes at 10 frames/s.
pub struct Wakeup {
    multiplier: u32,
}

impl Wakeup {
    pub fn new(args: MultiplierArgs) -> Wakeup {
        Wakeup {
            multiplier: args.multiplier.max(1),
        }
    }
}

impl LightingProgram for Wakeup {
    fn name(&self) -> &'static str {
        if self.multiplier == 1 {
            "wakeup_demo"
        } else {
            "wakeup"
        }
    }

    fn run(&mut self, stage: &mut Stage) -> Result<(), Interrupted> {
        log::info!("Sunrise with multiplier={}", self.multiplier);
        walk_keyframes(stage, &SUNRISE, BASE_MULTIPLIER, self.multiplier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{Color, BLACK};
    use crate::programs::testing::stage;
    use crate::task::Task;

    #[test]
    fn demo_speed_has_its_own_name() {
        assert_eq!(Wakeup::new(MultiplierArgs { multiplier: 1 }).name(), "wakeup_demo");
        assert_eq!(Wakeup::new(MultiplierArgs { multiplier: 30 }).name(), "wakeup");
    }

    #[test]
    fn demo_runs_to_full_white() {
        let (mut stage, _, frames) = stage(20, 1);
        let mut program = Wakeup::new(MultiplierArgs { multiplier: 1 });
        assert_eq!(program.run(&mut stage), Ok(()));

        let frames = frames.lock().unwrap();
        let total_weight: u32 = SUNRISE.iter().take(SUNRISE.len() - 1).map(|k| k.weight).sum();
        assert_eq!(frames.len() as u32, total_weight * BASE_MULTIPLIER);

        // starts with 10% lit black, i.e. everything black
        assert!(frames[0].iter().all(|p| *p == BLACK));
        let white = Color::new(255, 200, 100);
        assert!(frames.last().unwrap().iter().all(|p| *p == white));
    }

    #[test]
    fn lit_region_never_shrinks() {
        let (mut stage, _, frames) = stage(20, 1);
        Wakeup::new(MultiplierArgs { multiplier: 1 }).run(&mut stage).unwrap();

        let lit: Vec<usize> = frames
            .lock()
            .unwrap()
            .iter()
            .map(|f| f.iter().take_while(|p| **p != BLACK).count())
            .collect();
        // first frames are black; once lit, the region only grows
        let first_lit = lit.iter().position(|n| *n > 0).unwrap();
        for pair in lit[first_lit..].windows(2) {
            assert!(pair[1] >= pair[0], "{pair:?}");
        }
    }

    #[test]
    fn stops_at_the_next_checkpoint() {
        let (mut stage, queue, frames) = stage(20, 4);
        queue.enqueue(Task::Blackout);
        let mut program = Wakeup::new(MultiplierArgs { multiplier: 30 });
        assert_eq!(program.run(&mut stage), Err(Interrupted));
        assert_eq!(frames.lock().unwrap().len(), 4);
    }
}
