//! One image-editing session and the commands that drive it.
//!
//! A [`Session`] starts empty. Loading an image keeps a snapshot of it next
//! to the working buffer; applying a recolor only ever touches the working
//! buffer, and cancel copies the snapshot back. Every command goes through
//! [`Session::handle`], which either produces the next session or hands the
//! old one back untouched together with the error.

use std::fmt;
use std::path::PathBuf;

use image::{Rgb, RgbaImage};
use indicatif::ProgressBar;
use log::{debug, info};

use crate::codec::{self, SaveFormat};
use crate::error::{Missing, SessionError};
use crate::recolor::{RecolorPlan, RecolorStats};
use crate::types::Tolerance;
use crate::utils::format_color;
use crate::viewport::Viewport;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Load(PathBuf),
    /// Sample the source color under a click on the display surface.
    PickSource { x: u32, y: u32 },
    /// Sample the source color at an image pixel.
    PickPixel { x: u32, y: u32 },
    SetSource(Rgb<u8>),
    SetTarget(Rgb<u8>),
    SetTolerance(Tolerance),
    Apply,
    Cancel,
    Save {
        path: PathBuf,
        format: Option<SaveFormat>,
    },
    Preview(PathBuf),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Loaded {
        path: PathBuf,
        width: u32,
        height: u32,
    },
    SourcePicked(Rgb<u8>),
    SourceSet(Rgb<u8>),
    TargetSet(Rgb<u8>),
    ToleranceSet(Tolerance),
    Applied(RecolorStats),
    Reverted,
    Saved(PathBuf),
    PreviewWritten(PathBuf),
    /// The command needs an image and there is none; nothing happened.
    Ignored,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Loaded {
                path,
                width,
                height,
            } => write!(f, "Opened {} ({}x{})", path.display(), width, height),
            Outcome::SourcePicked(color) | Outcome::SourceSet(color) => {
                write!(f, "Color to replace: {}", format_color(*color))
            }
            Outcome::TargetSet(color) => write!(f, "New color: {}", format_color(*color)),
            Outcome::ToleranceSet(tolerance) => write!(f, "Tolerance: {}", tolerance),
            Outcome::Applied(stats) => write!(
                f,
                "Recolored {} of {} pixels",
                stats.matched, stats.total
            ),
            Outcome::Reverted => write!(f, "Changes cancelled"),
            Outcome::Saved(path) => write!(f, "Image saved as {}", path.display()),
            Outcome::PreviewWritten(path) => write!(f, "Preview written to {}", path.display()),
            Outcome::Ignored => write!(f, "No image loaded, nothing to do"),
        }
    }
}

#[derive(Debug, Clone)]
struct LoadedImage {
    path: PathBuf,
    working: RgbaImage,
    original: RgbaImage,
}

#[derive(Clone, Default)]
pub struct Session {
    image: Option<LoadedImage>,
    source: Option<Rgb<u8>>,
    target: Option<Rgb<u8>>,
    tolerance: Tolerance,
    viewport: Viewport,
    default_format: SaveFormat,
    progress: Option<ProgressBar>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("image", &self.image.as_ref().map(|l| (&l.path, l.working.dimensions())))
            .field("source", &self.source)
            .field("target", &self.target)
            .field("tolerance", &self.tolerance)
            .field("viewport", &self.viewport)
            .field("default_format", &self.default_format)
            .finish()
    }
}

impl Session {
    pub fn new(viewport: Viewport, default_format: SaveFormat) -> Self {
        Session {
            viewport,
            default_format,
            ..Session::default()
        }
    }

    pub fn with_tolerance(mut self, tolerance: Tolerance) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Reports recolor progress, one tick per image row.
    pub fn with_progress(mut self, pb: ProgressBar) -> Self {
        self.progress = Some(pb);
        self
    }

    /// Starts a session on an already decoded image.
    pub fn with_image(mut self, path: impl Into<PathBuf>, image: RgbaImage) -> Self {
        self.image = Some(LoadedImage {
            path: path.into(),
            original: image.clone(),
            working: image,
        });
        self
    }

    pub fn is_loaded(&self) -> bool {
        self.image.is_some()
    }

    pub fn image(&self) -> Option<&RgbaImage> {
        self.image.as_ref().map(|loaded| &loaded.working)
    }

    pub fn original(&self) -> Option<&RgbaImage> {
        self.image.as_ref().map(|loaded| &loaded.original)
    }

    pub fn source(&self) -> Option<Rgb<u8>> {
        self.source
    }

    pub fn target(&self) -> Option<Rgb<u8>> {
        self.target
    }

    pub fn tolerance(&self) -> Tolerance {
        self.tolerance
    }

    /// Runs `command` against this session.
    ///
    /// On success the returned session is the new state; on failure it is
    /// `self`, unchanged.
    pub fn handle(mut self, command: Command) -> (Session, Result<Outcome, SessionError>) {
        debug!("handling {:?}", command);
        let result = self.step(command);
        (self, result)
    }

    /// In-place form of [`Session::handle`].
    pub fn dispatch(&mut self, command: Command) -> Result<Outcome, SessionError> {
        let session = std::mem::take(self);
        let (next, result) = session.handle(command);
        *self = next;
        result
    }

    // Every arm validates before it writes, so an Err never leaves a
    // half-applied change behind.
    fn step(&mut self, command: Command) -> Result<Outcome, SessionError> {
        match command {
            Command::Load(path) => self.load(path),
            Command::PickSource { x, y } => self.pick_source(x, y),
            Command::PickPixel { x, y } => self.pick_pixel(x, y),
            Command::SetSource(color) => {
                self.source = Some(color);
                Ok(Outcome::SourceSet(color))
            }
            Command::SetTarget(color) => {
                self.target = Some(color);
                Ok(Outcome::TargetSet(color))
            }
            Command::SetTolerance(tolerance) => {
                self.tolerance = tolerance;
                Ok(Outcome::ToleranceSet(tolerance))
            }
            Command::Apply => self.apply(),
            Command::Cancel => Ok(self.cancel()),
            Command::Save { path, format } => self.save(path, format),
            Command::Preview(path) => self.preview(path),
        }
    }

    fn load(&mut self, path: PathBuf) -> Result<Outcome, SessionError> {
        let working = codec::load_rgba(&path)?;
        let (width, height) = working.dimensions();
        info!("loaded {} ({}x{})", path.display(), width, height);
        self.image = Some(LoadedImage {
            path: path.clone(),
            original: working.clone(),
            working,
        });
        Ok(Outcome::Loaded {
            path,
            width,
            height,
        })
    }

    fn pick_source(&mut self, x: u32, y: u32) -> Result<Outcome, SessionError> {
        let Some(loaded) = &self.image else {
            return Ok(Outcome::Ignored);
        };
        let (width, height) = loaded.working.dimensions();
        let (ix, iy) = self
            .viewport
            .to_image_coords(x, y, width, height)
            .ok_or(SessionError::OutOfBounds {
                x,
                y,
                width: self.viewport.width,
                height: self.viewport.height,
            })?;
        debug!("canvas ({}, {}) -> image ({}, {})", x, y, ix, iy);
        self.pick_pixel(ix, iy)
    }

    fn pick_pixel(&mut self, x: u32, y: u32) -> Result<Outcome, SessionError> {
        let Some(loaded) = &self.image else {
            return Ok(Outcome::Ignored);
        };
        let pixel = loaded
            .working
            .get_pixel_checked(x, y)
            .ok_or(SessionError::OutOfBounds {
                x,
                y,
                width: loaded.working.width(),
                height: loaded.working.height(),
            })?;
        let color = Rgb([pixel[0], pixel[1], pixel[2]]);
        self.source = Some(color);
        Ok(Outcome::SourcePicked(color))
    }

    fn apply(&mut self) -> Result<Outcome, SessionError> {
        let mut missing = Vec::new();
        if self.image.is_none() {
            missing.push(Missing::Image);
        }
        if self.source.is_none() {
            missing.push(Missing::SourceColor);
        }
        if self.target.is_none() {
            missing.push(Missing::TargetColor);
        }
        let (Some(loaded), Some(source), Some(target)) =
            (self.image.as_mut(), self.source, self.target)
        else {
            return Err(SessionError::Precondition { missing });
        };

        let plan = RecolorPlan::new(source, target, self.tolerance);
        let stats = match &self.progress {
            Some(pb) => plan.apply_with_progress(&mut loaded.working, pb)?,
            None => plan.apply(&mut loaded.working)?,
        };
        info!(
            "recolored {}/{} pixels of {}",
            stats.matched,
            stats.total,
            loaded.path.display()
        );
        Ok(Outcome::Applied(stats))
    }

    fn cancel(&mut self) -> Outcome {
        match self.image.as_mut() {
            Some(loaded) => {
                loaded.working = loaded.original.clone();
                Outcome::Reverted
            }
            None => Outcome::Ignored,
        }
    }

    fn save(&self, path: PathBuf, format: Option<SaveFormat>) -> Result<Outcome, SessionError> {
        let loaded = self.image.as_ref().ok_or(SessionError::NoImage)?;
        let written = codec::save_rgba(&loaded.working, &path, format, self.default_format)?;
        info!("saved {}", written.display());
        Ok(Outcome::Saved(written))
    }

    fn preview(&self, path: PathBuf) -> Result<Outcome, SessionError> {
        let loaded = self.image.as_ref().ok_or(SessionError::NoImage)?;
        let shown = self.viewport.render(&loaded.working);
        let written = codec::save_rgba(&shown, &path, None, self.default_format)?;
        Ok(Outcome::PreviewWritten(written))
    }
}
