use crate::color::Color;

#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("cannot send frame: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot encode frame: {0}")]
    Encode(String),
}

/// The physical strip. Pixels are staged with `set_pixel` and become visible
/// on `show`.
pub trait DeviceSink: Send {
    fn pixel_count(&self) -> usize;
    fn set_pixel(&mut self, index: usize, color: Color);
    fn show(&mut self) -> Result<(), SinkError>;
}

pub struct LogSink {
    pixels: Vec<Color>,
    frames: u64,
}

impl LogSink {
    pub fn new(pixel_count: usize) -> LogSink {
        LogSink {
            pixels: vec![crate::color::BLACK; pixel_count],
            frames: 0,
        }
    }
}

impl DeviceSink for LogSink {
    fn pixel_count(&self) -> usize {
        self.pixels.len()
    }

    fn set_pixel(&mut self, index: usize, color: Color) {
        if let Some(pixel) = self.pixels.get_mut(index) {
            *pixel = color;
        }
    }

    fn show(&mut self) -> Result<(), SinkError> {
        self.frames += 1;
        let lit = self
            .pixels
            .iter()
            .filter(|p| **p != crate::color::BLACK)
            .count();
        if let Some(first) = self.pixels.first() {
            log::trace!(
                "frame {}: {}/{} lit, first pixel {:?}",
                self.frames,
                lit,
                self.pixels.len(),
                first.into_components()
            );
        }
        Ok(())
    }
}
