use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;

/// Color used for labels the table does not know.
pub const FALLBACK: Rgb888 = Rgb888::WHITE;

const COLORS: [(&str, Rgb888); 6] = [
    ("surprise", Rgb888::new(83, 183, 184)),
    ("angry", Rgb888::new(220, 50, 35)),
    ("disgust", Rgb888::new(36, 164, 79)),
    ("sad", Rgb888::new(4, 119, 186)),
    ("happy", Rgb888::new(239, 151, 27)),
    ("fear", Rgb888::new(146, 37, 128)),
];

/// Look up the display color for an emotion label.
pub fn color_for(label: &str) -> Rgb888 {
    COLORS
        .iter()
        .find(|(name, _)| *name == label)
        .map(|(_, color)| *color)
        .unwrap_or(FALLBACK)
}
