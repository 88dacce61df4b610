use crate::color::BLACK;
use crate::programs::LightingProgram;
use crate::stage::{Interrupted, Stage};

pub struct Blackout;

impl LightingProgram for Blackout {
    fn name(&self) -> &'static str {
        "blackout"
    }

    fn run(&mut self, stage: &mut Stage) -> Result<(), Interrupted> {
        stage.fill(BLACK);
        loop {
            stage.present()?;
        }
    }

    fn pulse_on_interrupt(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::programs::testing::stage;
    use crate::task::Task;

    #[test]
    fn blacks_out_until_interrupted() {
        let (mut stage, queue, frames) = stage(6, 2);
        stage.fill(Color::new(9, 9, 9));
        queue.enqueue(Task::Kill);

        assert_eq!(Blackout.run(&mut stage), Err(Interrupted));

        let frames = frames.lock().unwrap();
        assert_eq!(frames.len(), 2);
        assert!(frames.iter().flatten().all(|p| *p == BLACK));
    }
}
