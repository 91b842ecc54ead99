use std::convert::Infallible;

use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::mono_font::ascii::FONT_9X15;
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};
use embedded_graphics::text::{Baseline, Text};
use image::{Rgb, RgbImage};

use crate::EmotionScore;
use crate::palette;

const LABEL_X: i32 = 10;
const LABEL_BASELINE_Y: i32 = 30;
const BAR_X: i32 = 150;
const BAR_TOP: i32 = 15;
const BAR_BOTTOM: i32 = 35;
const TRACK_END_X: i32 = 400;
const ROW_STEP: i32 = 40;

/// Pixels of bar per score point. A score of 100 reaches the end of the track.
const BAR_SCALE: f32 = 2.5;

/// Exposes an [`RgbImage`] as an embedded-graphics draw target.
///
/// Pixels falling outside the frame are dropped, so drawing never fails and
/// oversized bars simply run off the edge.
pub struct Canvas<'a> {
    frame: &'a mut RgbImage,
}

impl<'a> Canvas<'a> {
    pub fn new(frame: &'a mut RgbImage) -> Self {
        Self { frame }
    }
}

impl OriginDimensions for Canvas<'_> {
    fn size(&self) -> Size {
        Size::new(self.frame.width(), self.frame.height())
    }
}

impl DrawTarget for Canvas<'_> {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if point.x < 0 || point.y < 0 {
                continue;
            }
            let (x, y) = (point.x as u32, point.y as u32);
            if x < self.frame.width() && y < self.frame.height() {
                self.frame.put_pixel(x, y, Rgb([color.r(), color.g(), color.b()]));
            }
        }
        Ok(())
    }
}

/// Draw one row per score: the label, a filled bar proportional to the score,
/// and a fixed white track outline over it.
///
/// Rows stack top to bottom in the order the scores are given. Bars are not
/// clamped to the track, so out-of-range scores paint short of it or past it.
pub fn draw_scores<D>(target: &mut D, scores: &[EmotionScore]) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb888>,
{
    for (i, entry) in scores.iter().enumerate() {
        let row = i as i32 * ROW_STEP;
        let color = palette::color_for(&entry.label);

        Text::with_baseline(
            &entry.label,
            Point::new(LABEL_X, LABEL_BASELINE_Y + row),
            MonoTextStyle::new(&FONT_9X15, color),
            Baseline::Alphabetic,
        )
        .draw(target)?;

        let bar_end = BAR_X + (entry.score * BAR_SCALE).round() as i32;
        Rectangle::with_corners(
            Point::new(BAR_X, BAR_TOP + row),
            Point::new(bar_end, BAR_BOTTOM + row),
        )
        .into_styled(PrimitiveStyle::with_fill(color))
        .draw(target)?;

        Rectangle::with_corners(
            Point::new(BAR_X, BAR_TOP + row),
            Point::new(TRACK_END_X, BAR_BOTTOM + row),
        )
        .into_styled(PrimitiveStyle::with_stroke(palette::FALLBACK, 1))
        .draw(target)?;
    }
    Ok(())
}
