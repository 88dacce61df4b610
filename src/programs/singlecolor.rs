use crate::color::Color;
use crate::programs::LightingProgram;
use crate::stage::{Interrupted, Stage};
use crate::task::SingleColorArgs;

pub struct SingleColor {
    color: Color,
}

impl SingleColor {
    pub fn new(args: SingleColorArgs) -> SingleColor {
        SingleColor {
            color: Color::new(args.red, args.green, args.blue),
        }
    }
}

impl LightingProgram for SingleColor {
    fn name(&self) -> &'static str {
        "single_color"
    }

    fn run(&mut self, stage: &mut Stage) -> Result<(), Interrupted> {
        log::info!("Holding rgb = {:?}", self.color.into_components());
        stage.fill(self.color);
        loop {
            stage.present()?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::programs::testing::stage;
    use crate::task::Task;

    #[test]
    fn holds_color_on_every_pixel() {
        let (mut stage, queue, frames) = stage(5, 3);
        queue.enqueue(Task::Blackout);

        let mut program = SingleColor::new(SingleColorArgs {
            red: 10,
            green: 20,
            blue: 30,
        });
        assert_eq!(program.run(&mut stage), Err(Interrupted));

        let frames = frames.lock().unwrap();
        assert_eq!(frames.len(), 3);
        assert!(frames.iter().flatten().all(|p| *p == Color::new(10, 20, 30)));
    }
}
