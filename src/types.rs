use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use image::Rgb;

use crate::codec::SaveFormat;
use crate::constants::MAX_TOLERANCE;
use crate::session::Command;
use crate::viewport::Viewport;

/// Largest color distance, in channel units, at which a pixel still matches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Tolerance(u8);

impl Tolerance {
    pub fn new(value: u32) -> Option<Self> {
        if value <= MAX_TOLERANCE as u32 {
            Some(Tolerance(value as u8))
        } else {
            None
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl fmt::Display for Tolerance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Tolerance {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: u32 = s
            .trim()
            .parse()
            .map_err(|e| format!("Failed to parse tolerance '{}': {}", s, e))?;
        Tolerance::new(value)
            .ok_or_else(|| format!("Tolerance {} is outside 0-{}", value, MAX_TOLERANCE))
    }
}

/// Where a batch run takes its source color from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSource {
    Color(Rgb<u8>),
    /// Click position on the display surface.
    Canvas { x: u32, y: u32 },
    /// Pixel position in the image itself.
    Pixel { x: u32, y: u32 },
}

#[derive(Debug, Clone)]
pub struct BatchJob {
    pub input_output_pairs: Vec<(PathBuf, PathBuf)>,
    pub source: ColorSource,
    pub target: Rgb<u8>,
    pub format: Option<SaveFormat>,
    pub preview: Option<PathBuf>,
}

impl BatchJob {
    /// The session commands that recolor `input` into `output`.
    pub fn commands_for(&self, input: &Path, output: &Path, tolerance: Tolerance) -> Vec<Command> {
        let pick = match self.source {
            ColorSource::Color(color) => Command::SetSource(color),
            ColorSource::Canvas { x, y } => Command::PickSource { x, y },
            ColorSource::Pixel { x, y } => Command::PickPixel { x, y },
        };

        let mut commands = vec![
            Command::Load(input.to_path_buf()),
            pick,
            Command::SetTarget(self.target),
            Command::SetTolerance(tolerance),
            Command::Apply,
            Command::Save {
                path: output.to_path_buf(),
                format: self.format,
            },
        ];
        if let Some(preview) = &self.preview {
            commands.push(Command::Preview(preview.clone()));
        }
        commands
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptInput {
    Stdin,
    File(PathBuf),
}

#[derive(Debug, Clone)]
pub enum Mode {
    Batch(BatchJob),
    Script(ScriptInput),
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub mode: Mode,
    pub tolerance: Tolerance,
    pub default_format: SaveFormat,
    pub viewport: Viewport,
    pub colors: crate::utils::ColorBook,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tolerance_range() {
        assert_eq!("0".parse::<Tolerance>().unwrap().value(), 0);
        assert_eq!(" 100 ".parse::<Tolerance>().unwrap().value(), 100);
        assert!("101".parse::<Tolerance>().is_err());
        assert!("-1".parse::<Tolerance>().is_err());
        assert!("ten".parse::<Tolerance>().is_err());
        assert_eq!(Tolerance::default().value(), 0);
    }

    #[test]
    fn batch_commands_sample_before_apply() {
        let job = BatchJob {
            input_output_pairs: Vec::new(),
            source: ColorSource::Canvas { x: 5, y: 6 },
            target: Rgb([1, 2, 3]),
            format: None,
            preview: Some(PathBuf::from("p.png")),
        };
        let tolerance = Tolerance::new(9).unwrap();
        let commands = job.commands_for(Path::new("in.png"), Path::new("out.png"), tolerance);
        assert_eq!(
            commands,
            vec![
                Command::Load(PathBuf::from("in.png")),
                Command::PickSource { x: 5, y: 6 },
                Command::SetTarget(Rgb([1, 2, 3])),
                Command::SetTolerance(tolerance),
                Command::Apply,
                Command::Save {
                    path: PathBuf::from("out.png"),
                    format: None
                },
                Command::Preview(PathBuf::from("p.png")),
            ]
        );
    }
}
