//! Line-oriented command scripts.
//!
//! ```text
//! # comments and blank lines are skipped
//! open photo.jpg
//! pick 250 120
//! target #3366ff
//! tolerance 40
//! apply
//! save photo-blue.png
//! ```

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use log::warn;

use crate::codec::SaveFormat;
use crate::error::ScriptError;
use crate::session::{Command, Outcome, Session};
use crate::types::Tolerance;
use crate::utils::ColorBook;

/// Parses one script line; `Ok(None)` for blank lines and comments.
pub fn parse_line(
    line: &str,
    number: usize,
    colors: &ColorBook,
) -> Result<Option<Command>, ScriptError> {
    let fail = |message: String| ScriptError {
        line: number,
        message,
    };

    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word.to_lowercase().as_str() {
        "open" | "load" => Command::Load(path_arg(rest).map_err(fail)?),
        "pick" | "click" => {
            let (x, y) = point_arg(rest).map_err(fail)?;
            Command::PickSource { x, y }
        }
        "pixel" => {
            let (x, y) = point_arg(rest).map_err(fail)?;
            Command::PickPixel { x, y }
        }
        "source" => Command::SetSource(colors.parse(rest).map_err(|e| fail(e.to_string()))?),
        "target" | "color" => {
            Command::SetTarget(colors.parse(rest).map_err(|e| fail(e.to_string()))?)
        }
        "tolerance" => Command::SetTolerance(rest.parse::<Tolerance>().map_err(fail)?),
        "apply" => no_args(rest, Command::Apply).map_err(fail)?,
        "cancel" | "revert" => no_args(rest, Command::Cancel).map_err(fail)?,
        "save" => {
            let (path, format) = save_args(rest).map_err(fail)?;
            Command::Save { path, format }
        }
        "preview" => Command::Preview(path_arg(rest).map_err(fail)?),
        other => return Err(fail(format!("unknown command '{}'", other))),
    };
    Ok(Some(command))
}

/// Runs every line of `reader` against `session`.
///
/// Outcomes go to `out` and errors to `err`, one line each; a failing line
/// does not stop the ones after it. Returns how many lines failed.
pub fn run<R, O, E>(
    reader: R,
    session: &mut Session,
    colors: &ColorBook,
    out: &mut O,
    err: &mut E,
) -> io::Result<usize>
where
    R: BufRead,
    O: Write,
    E: Write,
{
    let mut failed = 0;

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let command = match parse_line(&line, index + 1, colors) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                writeln!(err, "Error: {}", e)?;
                failed += 1;
                continue;
            }
        };

        match session.dispatch(command) {
            Ok(Outcome::Ignored) => warn!("line {}: no image loaded, skipped", index + 1),
            Ok(outcome) => writeln!(out, "{}", outcome)?,
            Err(e) => {
                writeln!(err, "Error: line {}: {}", index + 1, e)?;
                failed += 1;
            }
        }
    }

    Ok(failed)
}

fn no_args(rest: &str, command: Command) -> Result<Command, String> {
    if rest.is_empty() {
        Ok(command)
    } else {
        Err(format!("unexpected arguments '{}'", rest))
    }
}

fn path_arg(rest: &str) -> Result<PathBuf, String> {
    if rest.is_empty() {
        Err("expected a path".to_string())
    } else {
        Ok(PathBuf::from(rest))
    }
}

/// Accepts `X Y` or `X,Y`.
pub fn point_arg(rest: &str) -> Result<(u32, u32), String> {
    let parts: Vec<&str> = rest
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .collect();
    match parts.as_slice() {
        [x, y] => {
            let x = x
                .parse()
                .map_err(|e| format!("Failed to parse x '{}': {}", x, e))?;
            let y = y
                .parse()
                .map_err(|e| format!("Failed to parse y '{}': {}", y, e))?;
            Ok((x, y))
        }
        _ => Err(format!("expected a point 'X Y', got '{}'", rest)),
    }
}

/// `PATH [FORMAT]`, where a trailing word counts as the format only if it
/// names one.
fn save_args(rest: &str) -> Result<(PathBuf, Option<SaveFormat>), String> {
    if let Some((path, last)) = rest.rsplit_once(char::is_whitespace) {
        if let Ok(format) = last.parse::<SaveFormat>() {
            return Ok((path_arg(path.trim())?, Some(format)));
        }
    }
    Ok((path_arg(rest)?, None))
}
