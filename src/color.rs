use palette::Srgb;

pub type Color = Srgb<u8>;

pub const BLACK: Color = Color::new(0, 0, 0);

/// Scale a color by a brightness percentage in `0..=100`.
pub fn scale_brightness(color: Color, percent: u8) -> Color {
    let factor = f32::from(percent.min(100)) / 100.0;
    let scaled = color.into_format::<f32>() * factor;
    scaled.into_format::<u8>()
}
