//! Replace one color in an image with another while keeping its shading.
//!
//! [`recolor`](mod@recolor) holds the pixel math and knows nothing about files or state.
//! [`session::Session`] wraps it in the load / pick / apply / cancel / save
//! lifecycle, driven by [`session::Command`] values.

pub mod codec;
pub mod config;
pub mod constants;
pub mod error;
pub mod recolor;
pub mod script;
pub mod session;
pub mod types;
pub mod utils;
pub mod viewport;

pub use error::{AppError, RecolorError, SessionError};
pub use recolor::{recolor, RecolorPlan, RecolorStats};
pub use session::{Command, Outcome, Session};
pub use types::Tolerance;
