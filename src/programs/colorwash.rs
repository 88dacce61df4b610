use rand::Rng;

use crate::color::{scale_brightness, Color};
use crate::interpolation::{StripState, Transition};
use crate::programs::LightingProgram;
use crate::stage::{Interrupted, Stage};
use crate::task::ColorWashArgs;

const PALETTE: [Color; 9] = [
    Color::new(255, 0, 255), // pink
    Color::new(128, 0, 255), // purple
    Color::new(255, 0, 128), // bright pink
    Color::new(0, 255, 255), // teal
    Color::new(0, 255, 128), // green teal
    Color::new(0, 128, 255), // blue teal
    Color::new(255, 0, 0),   // red
    Color::new(0, 255, 0),   // green
    Color::new(0, 0, 255),   // blue
];

/// Wanders through the palette: hold a color for the dwell time, then fade
/// to a different random one over the transition time, forever.
pub struct ColorWash {
    args: ColorWashArgs,
    previous: Option<usize>,
}

impl ColorWash {
    pub fn new(args: ColorWashArgs) -> ColorWash {
        ColorWash {
            args,
            previous: None,
        }
    }

    fn pick<R: Rng>(&mut self, rng: &mut R) -> Color {
        let index = match self.previous {
            None => rng.gen_range(0..PALETTE.len()),
            Some(previous) => {
                let index = rng.gen_range(0..PALETTE.len() - 1);
                if index >= previous {
                    index + 1
                } else {
                    index
                }
            }
        };
        self.previous = Some(index);
        scale_brightness(PALETTE[index], self.args.brightness_percent)
    }
}

impl LightingProgram for ColorWash {
    fn name(&self) -> &'static str {
        "changing_color"
    }

    fn run(&mut self, stage: &mut Stage) -> Result<(), Interrupted> {
        log::info!(
            "Washing with dwell {:?}, transition {:?}, brightness {}%",
            self.args.dwell,
            self.args.transition,
            self.args.brightness_percent
        );

        let strip_len = stage.pixel_count();
        let mut rng = rand::thread_rng();
        let mut current = self.pick(&mut rng);
        stage.fill(current);

        loop {
            // At least one frame per cycle keeps a zero dwell paced.
            let dwell_frames = stage.frames_for(self.args.dwell).max(1);
            for _ in 0..dwell_frames {
                stage.present()?;
            }

            let next = self.pick(&mut rng);
            let steps = stage.frames_for(self.args.transition);
            let transition = Transition::new(
                StripState::uniform(current, strip_len),
                StripState::uniform(next, strip_len),
                steps,
                strip_len,
            );
            for state in transition {
                stage.render(state);
                stage.present()?;
            }

            stage.fill(next);
            current = next;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::programs::testing::stage;
    use crate::task::Task;

    #[test]
    fn never_picks_the_same_color_twice_in_a_row() {
        let mut wash = ColorWash::new(ColorWashArgs::default());
        let mut rng = StdRng::seed_from_u64(7);
        let mut last = wash.pick(&mut rng);
        for _ in 0..500 {
            let next = wash.pick(&mut rng);
            assert_ne!(next, last);
            last = next;
        }
    }

    #[test]
    fn picks_are_scaled_by_brightness() {
        let mut wash = ColorWash::new(ColorWashArgs {
            brightness_percent: 0,
            ..ColorWashArgs::default()
        });
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(wash.pick(&mut rng), Color::new(0, 0, 0));
    }

    #[test]
    fn zero_timings_keep_cycling_through_colors() {
        let (mut stage, queue, frames) = stage(4, 1);
        let mut wash = ColorWash::new(ColorWashArgs {
            dwell: Duration::ZERO,
            transition: Duration::ZERO,
            brightness_percent: 100,
        });

        let producer = queue.clone();
        let watcher = std::sync::Arc::clone(&frames);
        let interrupter = std::thread::spawn(move || {
            while watcher.lock().unwrap().len() < 20 {
                std::thread::yield_now();
            }
            producer.enqueue(Task::Blackout);
        });

        assert_eq!(wash.run(&mut stage), Err(Interrupted));
        interrupter.join().unwrap();

        let frames = frames.lock().unwrap();
        assert!(frames.len() >= 20);
        // one frame per cycle, and consecutive cycles differ
        for pair in frames.windows(2).take(19) {
            assert_ne!(pair[0][0], pair[1][0]);
        }
    }

    #[test]
    fn transition_fades_between_picks() {
        let (mut stage, queue, frames) = stage(3, 1);
        let mut wash = ColorWash::new(ColorWashArgs {
            dwell: Duration::from_millis(2),
            transition: Duration::from_millis(10),
            brightness_percent: 100,
        });

        let producer = queue.clone();
        let watcher = std::sync::Arc::clone(&frames);
        let interrupter = std::thread::spawn(move || {
            while watcher.lock().unwrap().len() < 12 {
                std::thread::yield_now();
            }
            producer.enqueue(Task::Blackout);
        });

        assert_eq!(wash.run(&mut stage), Err(Interrupted));
        interrupter.join().unwrap();

        let frames = frames.lock().unwrap();
        // 2 dwell frames, then the fade starts at the dwell color
        assert_eq!(frames[0], frames[1]);
        assert_eq!(frames[1], frames[2]);
        assert!(PALETTE.contains(&frames[0][0]));
    }
}
