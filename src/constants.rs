pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Side length of the display surface clicks are measured against.
pub const CANVAS_SIZE: u32 = 500;

pub const MAX_TOLERANCE: u8 = 100;

pub const CONFIG_DIR: &str = ".config/color-replacer";

pub const OUTPUT_SUFFIX: &str = "_recolored";

pub const BASIC_COLORS: [(&str, [u8; 3]); 16] = [
    ("black", [0, 0, 0]),
    ("silver", [192, 192, 192]),
    ("gray", [128, 128, 128]),
    ("white", [255, 255, 255]),
    ("maroon", [128, 0, 0]),
    ("red", [255, 0, 0]),
    ("purple", [128, 0, 128]),
    ("fuchsia", [255, 0, 255]),
    ("green", [0, 128, 0]),
    ("lime", [0, 255, 0]),
    ("olive", [128, 128, 0]),
    ("yellow", [255, 255, 0]),
    ("navy", [0, 0, 128]),
    ("blue", [0, 0, 255]),
    ("teal", [0, 128, 128]),
    ("aqua", [0, 255, 255]),
];
