use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProgramName {
    Blackout,
    SingleColor,
    ChangingColor,
    Wakeup,
    SleepyTime,
    Kill,
}

impl ProgramName {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProgramName::Blackout => "blackout",
            ProgramName::SingleColor => "single_color",
            ProgramName::ChangingColor => "changing_color",
            ProgramName::Wakeup => "wakeup",
            ProgramName::SleepyTime => "sleepy_time",
            ProgramName::Kill => "KILL",
        }
    }
}

impl fmt::Display for ProgramName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProgramName {
    type Err = ArgumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "blackout" => Ok(ProgramName::Blackout),
            "single_color" => Ok(ProgramName::SingleColor),
            "changing_color" => Ok(ProgramName::ChangingColor),
            "wakeup" => Ok(ProgramName::Wakeup),
            "sleepy_time" => Ok(ProgramName::SleepyTime),
            "KILL" => Ok(ProgramName::Kill),
            other => Err(ArgumentError::UnknownProgram(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SingleColorArgs {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorWashArgs {
    pub dwell: Duration,
    pub transition: Duration,
    pub brightness_percent: u8,
}

impl Default for ColorWashArgs {
    fn default() -> Self {
        ColorWashArgs {
            dwell: Duration::from_millis(5000),
            transition: Duration::from_millis(2000),
            brightness_percent: 100,
        }
    }
}

/// Arguments of the keyframe programs. The multiplier stretches the whole
/// sequence; 1 is the fast demo speed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MultiplierArgs {
    pub multiplier: u32,
}

impl Default for MultiplierArgs {
    fn default() -> Self {
        MultiplierArgs { multiplier: 30 }
    }
}

/// A request to switch the strip to another program. Arguments are already
/// validated by the time a task is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    Blackout,
    SingleColor(SingleColorArgs),
    ChangingColor(ColorWashArgs),
    Wakeup(MultiplierArgs),
    SleepyTime(MultiplierArgs),
    Kill,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArgumentError {
    #[error("{0} is not a recognized program")]
    UnknownProgram(String),

    #[error("{program} does not accept argument '{key}'")]
    UnknownArgument { program: &'static str, key: String },

    #[error("'{key}' must be between {min} and {max}, got {value}")]
    OutOfRange {
        key: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },
}

impl Task {
    pub fn program(&self) -> ProgramName {
        match self {
            Task::Blackout => ProgramName::Blackout,
            Task::SingleColor(_) => ProgramName::SingleColor,
            Task::ChangingColor(_) => ProgramName::ChangingColor,
            Task::Wakeup(_) => ProgramName::Wakeup,
            Task::SleepyTime(_) => ProgramName::SleepyTime,
            Task::Kill => ProgramName::Kill,
        }
    }

    /// Validate a loosely typed program request into a task.
    ///
    /// `wakeup_demo` is accepted as a shorthand for `wakeup` with a
    /// multiplier of 1.
    pub fn from_request(name: &str, args: &BTreeMap<String, i64>) -> Result<Task, ArgumentError> {
        if name == "wakeup_demo" {
            Arguments::new("wakeup_demo", args, &[])?;
            return Ok(Task::Wakeup(MultiplierArgs { multiplier: 1 }));
        }

        let program = name.parse::<ProgramName>()?;
        match program {
            ProgramName::Blackout => {
                Arguments::new(program.as_str(), args, &[])?;
                Ok(Task::Blackout)
            }
            ProgramName::Kill => {
                Arguments::new(program.as_str(), args, &[])?;
                Ok(Task::Kill)
            }
            ProgramName::SingleColor => {
                let args = Arguments::new(program.as_str(), args, &["red", "green", "blue"])?;
                Ok(Task::SingleColor(SingleColorArgs {
                    red: args.channel("red")?,
                    green: args.channel("green")?,
                    blue: args.channel("blue")?,
                }))
            }
            ProgramName::ChangingColor => {
                let args = Arguments::new(
                    program.as_str(),
                    args,
                    &["dwellTimeMs", "transitionTimeMs", "brightnessScalePct"],
                )?;
                let defaults = ColorWashArgs::default();
                let millis = |key, default: Duration| -> Result<Duration, ArgumentError> {
                    let ms = args.get(key, 0, i64::MAX, default.as_millis() as i64)?;
                    Ok(Duration::from_millis(ms as u64))
                };
                Ok(Task::ChangingColor(ColorWashArgs {
                    dwell: millis("dwellTimeMs", defaults.dwell)?,
                    transition: millis("transitionTimeMs", defaults.transition)?,
                    brightness_percent: args.get(
                        "brightnessScalePct",
                        0,
                        100,
                        i64::from(defaults.brightness_percent),
                    )? as u8,
                }))
            }
            ProgramName::Wakeup | ProgramName::SleepyTime => {
                let args = Arguments::new(program.as_str(), args, &["multiplier"])?;
                let multiplier = args.get(
                    "multiplier",
                    1,
                    i64::from(u32::MAX),
                    i64::from(MultiplierArgs::default().multiplier),
                )? as u32;
                let args = MultiplierArgs { multiplier };
                if program == ProgramName::Wakeup {
                    Ok(Task::Wakeup(args))
                } else {
                    Ok(Task::SleepyTime(args))
                }
            }
        }
    }
}

struct Arguments<'a> {
    values: &'a BTreeMap<String, i64>,
}

impl<'a> Arguments<'a> {
    fn new(
        program: &'static str,
        values: &'a BTreeMap<String, i64>,
        accepted: &[&str],
    ) -> Result<Arguments<'a>, ArgumentError> {
        if let Some(key) = values.keys().find(|k| !accepted.contains(&k.as_str())) {
            return Err(ArgumentError::UnknownArgument {
                program,
                key: key.clone(),
            });
        }
        Ok(Arguments { values })
    }

    fn get(&self, key: &'static str, min: i64, max: i64, default: i64) -> Result<i64, ArgumentError> {
        match self.values.get(key) {
            None => Ok(default),
            Some(&value) if (min..=max).contains(&value) => Ok(value),
            Some(&value) => Err(ArgumentError::OutOfRange { key, value, min, max }),
        }
    }

    fn channel(&self, key: &'static str) -> Result<u8, ArgumentError> {
        Ok(self.get(key, 0, 255, 0)? as u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(pairs: &[(&str, i64)]) -> BTreeMap<String, i64> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn single_color_defaults_to_black() {
        let task = Task::from_request("single_color", &args(&[])).unwrap();
        assert_eq!(task, Task::SingleColor(SingleColorArgs::default()));
    }

    #[test]
    fn single_color_takes_channels() {
        let task =
            Task::from_request("single_color", &args(&[("red", 10), ("green", 20), ("blue", 30)]))
                .unwrap();
        assert_eq!(
            task,
            Task::SingleColor(SingleColorArgs {
                red: 10,
                green: 20,
                blue: 30
            })
        );
    }

    #[test]
    fn single_color_rejects_out_of_range_channel() {
        let err = Task::from_request("single_color", &args(&[("red", 256)])).unwrap_err();
        assert_eq!(
            err,
            ArgumentError::OutOfRange {
                key: "red",
                value: 256,
                min: 0,
                max: 255
            }
        );
        assert!(Task::from_request("single_color", &args(&[("blue", -1)])).is_err());
    }

    #[test]
    fn changing_color_parses_timings() {
        let task = Task::from_request(
            "changing_color",
            &args(&[("dwellTimeMs", 0), ("transitionTimeMs", 250), ("brightnessScalePct", 40)]),
        )
        .unwrap();
        assert_eq!(
            task,
            Task::ChangingColor(ColorWashArgs {
                dwell: Duration::ZERO,
                transition: Duration::from_millis(250),
                brightness_percent: 40,
            })
        );
        assert!(Task::from_request("changing_color", &args(&[("brightnessScalePct", 101)])).is_err());
        assert!(Task::from_request("changing_color", &args(&[("dwellTimeMs", -5)])).is_err());
    }

    #[test]
    fn multiplier_must_be_positive() {
        assert!(Task::from_request("wakeup", &args(&[("multiplier", 0)])).is_err());
        assert_eq!(
            Task::from_request("sleepy_time", &args(&[("multiplier", 2)])).unwrap(),
            Task::SleepyTime(MultiplierArgs { multiplier: 2 })
        );
        assert_eq!(
            Task::from_request("wakeup", &args(&[])).unwrap(),
            Task::Wakeup(MultiplierArgs { multiplier: 30 })
        );
    }

    #[test]
    fn wakeup_demo_is_fast_wakeup() {
        assert_eq!(
            Task::from_request("wakeup_demo", &args(&[])).unwrap(),
            Task::Wakeup(MultiplierArgs { multiplier: 1 })
        );
        assert!(Task::from_request("wakeup_demo", &args(&[("multiplier", 3)])).is_err());
    }

    #[test]
    fn unknown_program_and_argument_are_rejected() {
        assert_eq!(
            Task::from_request("full_wash", &args(&[])).unwrap_err(),
            ArgumentError::UnknownProgram("full_wash".to_string())
        );
        assert_eq!(
            Task::from_request("blackout", &args(&[("red", 1)])).unwrap_err(),
            ArgumentError::UnknownArgument {
                program: "blackout",
                key: "red".to_string()
            }
        );
    }

    #[test]
    fn program_names_round_trip_through_display() {
        for name in [
            ProgramName::Blackout,
            ProgramName::SingleColor,
            ProgramName::ChangingColor,
            ProgramName::Wakeup,
            ProgramName::SleepyTime,
            ProgramName::Kill,
        ] {
            assert_eq!(name.to_string().parse::<ProgramName>().unwrap(), name);
        }
    }
}
