use crate::color::{Color, BLACK};

/// A keyframe of a lighting program: a color, the share of the strip (from
/// pixel 0) that is lit with it, and the relative time spent moving from this
/// keyframe to the next one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Keyframe {
    pub color: Color,
    pub active_percent: u8,
    pub weight: u32,
}

impl Keyframe {
    pub const fn new(red: u8, green: u8, blue: u8, active_percent: u8, weight: u32) -> Keyframe {
        Keyframe {
            color: Color::new(red, green, blue),
            active_percent,
            weight,
        }
    }

    pub fn state(&self, strip_len: usize) -> StripState {
        StripState {
            color: self.color,
            active_pixels: active_pixel_count(self.active_percent, strip_len),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StripState {
    pub color: Color,
    pub active_pixels: usize,
}

impl StripState {
    pub fn uniform(color: Color, strip_len: usize) -> StripState {
        StripState {
            color,
            active_pixels: strip_len,
        }
    }

    pub fn render(&self, pixels: &mut [Color]) {
        let lit = self.active_pixels.min(pixels.len());
        let (active, dark) = pixels.split_at_mut(lit);
        active.fill(self.color);
        dark.fill(BLACK);
    }
}

pub fn active_pixel_count(percent: u8, strip_len: usize) -> usize {
    let count = (f64::from(percent) * strip_len as f64 / 100.0).round();
    (count.max(0.0) as usize).min(strip_len)
}

pub fn iteration_count(weight: u32, base_multiplier: u32, multiplier: u32) -> u32 {
    weight
        .saturating_mul(base_multiplier)
        .saturating_mul(multiplier)
}

/// Linear transition between two strip states over a fixed number of steps.
///
/// Step `j` yields `from + round(delta * j / steps)` per channel, where the
/// lit pixel count is treated as a fourth channel. Step 0 is exactly `from`;
/// `to` itself is never yielded, the caller settles on it once the
/// transition is exhausted. A transition of zero steps yields nothing.
#[derive(Debug, Clone)]
pub struct Transition {
    from: [f64; 4],
    delta: [f64; 4],
    to: StripState,
    steps: u32,
    strip_len: usize,
    next: u32,
}

impl Transition {
    pub fn new(from: StripState, to: StripState, steps: u32, strip_len: usize) -> Transition {
        let from_channels = channels(&from);
        let to_channels = channels(&to);
        let mut delta = [0.0; 4];
        for (d, (f, t)) in delta.iter_mut().zip(from_channels.iter().zip(to_channels)) {
            *d = t - f;
        }

        Transition {
            from: from_channels,
            delta,
            to,
            steps,
            strip_len,
            next: 0,
        }
    }

    pub fn steps(&self) -> u32 {
        self.steps
    }

    pub fn target(&self) -> StripState {
        self.to
    }

    /// State at step `j`. Only meaningful for `j < steps`; a zero-step
    /// transition reports its target.
    pub fn at(&self, j: u32) -> StripState {
        if self.steps == 0 {
            return self.to;
        }

        let progress = f64::from(j) / f64::from(self.steps);
        let value = |c: usize| self.from[c] + (self.delta[c] * progress).round();

        StripState {
            color: Color::new(to_channel(value(0)), to_channel(value(1)), to_channel(value(2))),
            active_pixels: value(3).clamp(0.0, self.strip_len as f64) as usize,
        }
    }
}

impl Iterator for Transition {
    type Item = StripState;

    fn next(&mut self) -> Option<StripState> {
        if self.next >= self.steps {
            return None;
        }
        let state = self.at(self.next);
        self.next += 1;
        Some(state)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.steps.saturating_sub(self.next) as usize;
        (remaining, Some(remaining))
    }
}

fn channels(state: &StripState) -> [f64; 4] {
    [
        f64::from(state.color.red),
        f64::from(state.color.green),
        f64::from(state.color.blue),
        state.active_pixels as f64,
    ]
}

fn to_channel(value: f64) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    const STRIP_LEN: usize = 69;

    fn state(r: u8, g: u8, b: u8, active_pixels: usize) -> StripState {
        StripState {
            color: Color::new(r, g, b),
            active_pixels,
        }
    }

    #[test]
    fn active_pixel_count_rounds_to_nearest() {
        assert_eq!(active_pixel_count(0, STRIP_LEN), 0);
        assert_eq!(active_pixel_count(10, STRIP_LEN), 7);
        assert_eq!(active_pixel_count(15, STRIP_LEN), 10);
        assert_eq!(active_pixel_count(100, STRIP_LEN), STRIP_LEN);
        assert_eq!(active_pixel_count(250, STRIP_LEN), STRIP_LEN);
        assert_eq!(active_pixel_count(50, 0), 0);
    }

    #[test]
    fn first_step_is_source() {
        let from = state(0, 0, 10, 10);
        let to = state(2, 0, 15, 14);
        let mut transition = Transition::new(from, to, 60, STRIP_LEN);
        assert_eq!(transition.next(), Some(from));
    }

    #[test]
    fn last_step_is_within_one_unit_of_target() {
        let pairs = [
            (state(0, 0, 0, 0), state(255, 200, 100, STRIP_LEN)),
            (state(255, 255, 255, STRIP_LEN), state(0, 0, 0, 0)),
            (state(70, 15, 2, 41), state(255, 200, 100, STRIP_LEN)),
        ];
        for (from, to) in pairs {
            for steps in [255, 300, 840, 5000] {
                let last = Transition::new(from, to, steps, STRIP_LEN)
                    .last()
                    .unwrap();
                let close = |a: u8, b: u8| (i16::from(a) - i16::from(b)).abs() <= 1;
                assert!(close(last.color.red, to.color.red), "{last:?} vs {to:?}");
                assert!(close(last.color.green, to.color.green), "{last:?} vs {to:?}");
                assert!(close(last.color.blue, to.color.blue), "{last:?} vs {to:?}");
                assert!(last.active_pixels.abs_diff(to.active_pixels) <= 1);
            }
        }
    }

    #[test]
    fn yields_exactly_steps_states() {
        let transition = Transition::new(state(0, 0, 0, 0), state(9, 9, 9, 9), 7, STRIP_LEN);
        assert_eq!(transition.size_hint(), (7, Some(7)));
        assert_eq!(transition.count(), 7);
    }

    #[test]
    fn zero_steps_yields_nothing_and_reports_target() {
        let to = state(255, 200, 100, STRIP_LEN);
        let mut transition = Transition::new(state(0, 0, 0, 0), to, 0, STRIP_LEN);
        assert_eq!(transition.at(0), to);
        assert_eq!(transition.next(), None);
    }

    #[test]
    fn values_stay_in_range_for_extreme_inputs() {
        let extremes = [
            (state(0, 0, 0, 0), state(255, 255, 255, STRIP_LEN)),
            (state(255, 255, 255, STRIP_LEN), state(0, 0, 0, 0)),
            (state(255, 0, 255, STRIP_LEN * 4), state(0, 255, 0, 0)),
        ];
        for (from, to) in extremes {
            for steps in [1, 2, 3, 17, 1000, u32::MAX / 2] {
                let transition = Transition::new(from, to, steps, STRIP_LEN);
                for j in [0, 1, steps / 2, steps - 1, steps] {
                    let s = transition.at(j);
                    assert!(s.active_pixels <= STRIP_LEN, "{s:?} at {j}/{steps}");
                }
            }
        }
    }

    #[test]
    fn pixel_count_is_interpolated_like_a_channel() {
        let transition = Transition::new(state(10, 0, 0, 0), state(10, 0, 0, 10), 10, STRIP_LEN);
        let counts: Vec<usize> = transition.map(|s| s.active_pixels).collect();
        assert_eq!(counts, vec![0, 1, 2, 3, 4, 5, 6, 7, 8, 9]);
    }

    #[test]
    fn render_blacks_out_inactive_pixels() {
        let mut pixels = vec![Color::new(1, 2, 3); 5];
        state(9, 8, 7, 2).render(&mut pixels);
        assert_eq!(pixels[0], Color::new(9, 8, 7));
        assert_eq!(pixels[1], Color::new(9, 8, 7));
        assert!(pixels[2..].iter().all(|p| *p == BLACK));
    }

    #[test]
    fn iteration_count_saturates() {
        assert_eq!(iteration_count(5, 60, 30), 9000);
        assert_eq!(iteration_count(0, 60, 30), 0);
        assert_eq!(iteration_count(u32::MAX, 60, 30), u32::MAX);
    }
}
