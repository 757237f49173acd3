use crate::codec::SaveFormat;
use crate::constants::{CONFIG_DIR, OUTPUT_SUFFIX, VERSION};
use crate::error::AppError;
use crate::script::point_arg;
use crate::types::{AppConfig, BatchJob, ColorSource, Mode, ScriptInput, Tolerance};
use crate::utils::ColorBook;
use crate::viewport::{parse_filter, Viewport};

use clap::{App, Arg, ArgMatches, ErrorKind};
use config::builder::DefaultState;
use config::{ConfigBuilder, File};
use serde_derive::Deserialize;
use std::collections::HashMap;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
struct SerializedAppConfig {
    tolerance: String,
    output_format: String,
    canvas_width: String,
    canvas_height: String,
    preview_filter: String,
}

/// `~/.config/color-replacer`, where `config.toml` and `colors.toml` live.
pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from(""))
        .join(CONFIG_DIR)
}

fn load_config(
    config_dir: &Path,
    config_path: Option<&str>,
) -> Result<SerializedAppConfig, config::ConfigError> {
    let mut builder = ConfigBuilder::default();

    builder = builder
        .set_default("tolerance", "0")?
        .set_default("output_format", "png")?
        .set_default("canvas_width", "500")?
        .set_default("canvas_height", "500")?
        .set_default("preview_filter", "catmullrom")?;

    let default_config_path = config_dir.join("config.toml");

    if default_config_path.exists() {
        builder = ConfigBuilder::<DefaultState>::add_source(
            builder,
            File::from(default_config_path).required(false),
        );
    }

    if let Some(path) = config_path {
        builder = builder.add_source(File::with_name(path).required(true));
    }

    let config = builder.build()?;

    config.try_deserialize()
}

/// Built-in names plus whatever `colors.toml` in `config_dir` adds.
///
/// The file is a flat table of `name = "color"` entries, where each color is
/// written the same way as on the command line.
pub fn load_color_book(config_dir: &Path) -> Result<ColorBook, AppError> {
    let mut book = ColorBook::default();
    let colors_path = config_dir.join("colors.toml");
    if colors_path.exists() {
        let colors_str = fs::read_to_string(colors_path)?;
        let entries: HashMap<String, String> = toml::from_str(&colors_str)?;
        book.extend_from_text(&entries)?;
    }
    Ok(book)
}

fn cli() -> App<'static> {
    App::new("Color Replacer")
        .version(VERSION)
        .author("Taylor Beeston")
        .about("Replaces one color in an image with another, keeping the shading")
        .after_help("The color to replace comes from --source, or is sampled from the image with --pick (a click on the 500x500 display surface) or --pixel (image coordinates). Every pixel within --tolerance of it, measured as RGB distance, takes the --target color scaled to that pixel's brightness.\n\nColors may be written as #rrggbb, #rgb, r,g,b or a name. Names are the basic web colors plus any 'name = \"color\"' entries in ~/.config/color-replacer/colors.toml.\n\nWith --script, commands are read one per line instead: open, pick, pixel, source, target, tolerance, apply, cancel, save, preview.")
        .arg(
            Arg::new("Input")
                .help("Images to recolor")
                .multiple_values(true)
                .index(1),
        )
        .arg(
            Arg::new("Output")
                .short('o')
                .long("output")
                .value_name("PATH")
                .help("Where to save the result (single input only)")
                .takes_value(true),
        )
        .arg(
            Arg::new("Source")
                .short('s')
                .long("source")
                .value_name("COLOR")
                .help("Color to replace")
                .takes_value(true)
                .conflicts_with_all(&["Pick", "Pixel"]),
        )
        .arg(
            Arg::new("Pick")
                .short('p')
                .long("pick")
                .value_name("X,Y")
                .help("Sample the color to replace at a point on the 500x500 display surface")
                .takes_value(true)
                .conflicts_with("Pixel"),
        )
        .arg(
            Arg::new("Pixel")
                .long("pixel")
                .value_name("X,Y")
                .help("Sample the color to replace at an image pixel")
                .takes_value(true),
        )
        .arg(
            Arg::new("Target")
                .short('t')
                .long("target")
                .value_name("COLOR")
                .help("Replacement color")
                .takes_value(true),
        )
        .arg(
            Arg::new("Tolerance")
                .long("tolerance")
                .value_name("N")
                .help("[0-100] Overrides the tolerance set in config")
                .takes_value(true),
        )
        .arg(
            Arg::new("Format")
                .short('f')
                .long("format")
                .value_name("FORMAT")
                .help("png, jpg, bmp, tiff, gif or tga; overrides the output extension")
                .takes_value(true),
        )
        .arg(
            Arg::new("Preview")
                .long("preview")
                .value_name("PATH")
                .help("Also save the result as shown on the display surface (single input only)")
                .takes_value(true),
        )
        .arg(
            Arg::new("Script")
                .long("script")
                .value_name("FILE")
                .help("Run commands from FILE, or stdin for '-'")
                .takes_value(true)
                .conflicts_with_all(&[
                    "Input", "Output", "Source", "Pick", "Pixel", "Target", "Format", "Preview",
                ]),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("/path/to/config.toml")
                .help("Sets a custom config file")
                .takes_value(true),
        )
}

pub fn init() -> Result<AppConfig, AppError> {
    init_from(std::env::args_os())
}

pub fn init_from<I, T>(args: I) -> Result<AppConfig, AppError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    init_with(args, &config_dir())
}

/// Parses `args` with `config.toml` and `colors.toml` looked up in `config_dir`.
pub fn init_with<I, T>(args: I, config_dir: &Path) -> Result<AppConfig, AppError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = cli()
        .try_get_matches_from(args)
        .map_err(|e| match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => e.exit(),
            _ => AppError::Usage(e.to_string()),
        })?;

    let config = load_config(config_dir, matches.value_of("config"))?;
    let colors = load_color_book(config_dir)?;

    let tolerance: Tolerance = matches
        .value_of("Tolerance")
        .unwrap_or(&config.tolerance)
        .parse()
        .map_err(AppError::Usage)?;

    let default_format: SaveFormat = config.output_format.parse()?;

    let canvas_width: u32 = config
        .canvas_width
        .parse()
        .map_err(|e| AppError::Usage(format!("Failed to parse canvas_width: {}", e)))?;

    let canvas_height: u32 = config
        .canvas_height
        .parse()
        .map_err(|e| AppError::Usage(format!("Failed to parse canvas_height: {}", e)))?;

    if canvas_width == 0 || canvas_height == 0 {
        return Err(AppError::Usage("Canvas size must be at least 1x1".to_string()));
    }

    let filter = parse_filter(&config.preview_filter).ok_or_else(|| {
        AppError::Usage(format!("Unknown preview_filter '{}'", config.preview_filter))
    })?;

    let viewport = Viewport {
        width: canvas_width,
        height: canvas_height,
        filter,
    };

    let mode = match matches.value_of("Script") {
        Some("-") => Mode::Script(ScriptInput::Stdin),
        Some(path) => Mode::Script(ScriptInput::File(PathBuf::from(path))),
        None => Mode::Batch(batch_job(&matches, &colors, default_format)?),
    };

    Ok(AppConfig {
        mode,
        tolerance,
        default_format,
        viewport,
        colors,
    })
}

fn batch_job(
    matches: &ArgMatches,
    colors: &ColorBook,
    default_format: SaveFormat,
) -> Result<BatchJob, AppError> {
    let inputs: Vec<PathBuf> = matches
        .values_of("Input")
        .map(|values| values.map(PathBuf::from).collect())
        .unwrap_or_default();

    if inputs.is_empty() {
        return Err(AppError::Usage(
            "No input images given (or use --script)".to_string(),
        ));
    }

    let source = if let Some(color) = matches.value_of("Source") {
        ColorSource::Color(colors.parse(color)?)
    } else if let Some(point) = matches.value_of("Pick") {
        let (x, y) = point_arg(point).map_err(AppError::Usage)?;
        ColorSource::Canvas { x, y }
    } else if let Some(point) = matches.value_of("Pixel") {
        let (x, y) = point_arg(point).map_err(AppError::Usage)?;
        ColorSource::Pixel { x, y }
    } else {
        return Err(AppError::Usage(
            "Choose the color to replace with --source, --pick or --pixel".to_string(),
        ));
    };

    let target = match matches.value_of("Target") {
        Some(color) => colors.parse(color)?,
        None => {
            return Err(AppError::Usage(
                "Choose the new color with --target".to_string(),
            ))
        }
    };

    let format = matches
        .value_of("Format")
        .map(str::parse::<SaveFormat>)
        .transpose()?;

    let single = inputs.len() == 1;
    let output = matches.value_of("Output").map(PathBuf::from);
    let preview = matches.value_of("Preview").map(PathBuf::from);
    if !single && (output.is_some() || preview.is_some()) {
        return Err(AppError::Usage(
            "--output and --preview take a single input image".to_string(),
        ));
    }

    let input_output_pairs = match output {
        Some(output) => vec![(inputs[0].clone(), output)],
        None => inputs
            .into_iter()
            .map(|input| {
                let output = derive_output_path(
                    &input,
                    format.unwrap_or(default_format),
                    format.is_some(),
                );
                (input, output)
            })
            .collect(),
    };

    Ok(BatchJob {
        input_output_pairs,
        source,
        target,
        format,
        preview,
    })
}

/// `dir/photo.jpg` becomes `dir/photo_recolored.jpg`. The input's extension
/// is kept when it is a format we can write, unless `forced`.
pub fn derive_output_path(input: &Path, format: SaveFormat, forced: bool) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());

    let extension = match SaveFormat::from_path(input) {
        Some(_) if !forced => input
            .extension()
            .map(|ext| ext.to_string_lossy().into_owned())
            .unwrap_or_else(|| format.extension().to_string()),
        _ => format.extension().to_string(),
    };

    input.with_file_name(format!("{}{}.{}", stem, OUTPUT_SUFFIX, extension))
}
