pub(crate) mod blackout;
pub(crate) mod colorwash;
pub(crate) mod singlecolor;
pub(crate) mod sleepytime;
pub(crate) mod wakeup;

use crate::interpolation::{iteration_count, Keyframe, Transition};
use crate::stage::{Interrupted, Stage};

/// A lighting program. `run` returns `Ok` only when the program finished on
/// its own; every program yields with `Err(Interrupted)` as soon as a
/// checkpoint sees another task waiting.
pub trait LightingProgram {
    fn name(&self) -> &'static str;

    fn run(&mut self, stage: &mut Stage) -> Result<(), Interrupted>;

    fn pulse_on_interrupt(&self) -> bool {
        true
    }
}

/// Walk a keyframe sequence, interpolating each consecutive pair over
/// `weight * base_multiplier * multiplier` frames.
pub(crate) fn walk_keyframes(
    stage: &mut Stage,
    keyframes: &[Keyframe],
    base_multiplier: u32,
    multiplier: u32,
) -> Result<(), Interrupted> {
    let strip_len = stage.pixel_count();

    for (segment, pair) in keyframes.windows(2).enumerate() {
        let (from, to) = (pair[0], pair[1]);
        let steps = iteration_count(from.weight, base_multiplier, multiplier);
        let transition = Transition::new(from.state(strip_len), to.state(strip_len), steps, strip_len);
        log::debug!(
            "Segment {}: {:?} -> {:?} over {} frames",
            segment,
            from.color.into_components(),
            to.color.into_components(),
            transition.steps()
        );

        let target = transition.target();
        for state in transition {
            stage.render(state);
            stage.present()?;
        }
        stage.render(target);
    }

    stage.checkpoint()
}
