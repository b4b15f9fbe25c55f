use std::path::{Path, PathBuf};

use image::RgbImage;
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;
use rusttype::{Font, Scale};

use crate::geometry::center_of_rect;
use crate::grade::GradedSheet;
use crate::image_utils::{DARK_BLUE, DARK_GREEN, GREEN, RED, WHITE_RGB};
use crate::sheet::AnswerKey;

/// Creates a path for a debug image next to the input it was derived from.
pub fn debug_image_path(base: &Path, label: &str) -> PathBuf {
    let mut result = PathBuf::from(base);
    result.set_file_name(format!(
        "{}_debug_{}.png",
        base.file_stem().unwrap_or_default().to_str().unwrap_or_default(),
        label
    ));
    result
}

/// Writes annotated copies of a sheet image alongside the original. A
/// disabled writer ignores all writes, so callers never branch on debug mode.
pub struct ImageDebugWriter {
    input_path: Option<PathBuf>,
    base: Option<RgbImage>,
}

impl ImageDebugWriter {
    pub fn new(input_path: PathBuf, base: RgbImage) -> Self {
        Self {
            input_path: Some(input_path),
            base: Some(base),
        }
    }

    pub fn disabled() -> Self {
        Self {
            input_path: None,
            base: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.input_path.is_some()
    }

    pub fn write(&self, label: &str, draw: impl FnOnce(&mut RgbImage)) -> Option<PathBuf> {
        let (input_path, base) = match (&self.input_path, &self.base) {
            (Some(input_path), Some(base)) => (input_path, base),
            _ => return None,
        };

        let mut canvas = base.clone();
        draw(&mut canvas);
        let out = debug_image_path(input_path, label);
        match canvas.save(&out) {
            Ok(()) => {
                log::info!("wrote debug image: {}", out.display());
                Some(out)
            }
            Err(e) => {
                log::error!("failed to write debug image {}: {}", out.display(), e);
                None
            }
        }
    }
}

/// Draws the scoring outcome over the sheet: every bubble outlined, and the
/// correct option's bubble outlined green when the selection matched the key
/// or red when it did not. With a font, also draws per-bubble fill counts
/// and a final score banner.
pub fn draw_scored_sheet_debug_image_mut(
    canvas: &mut RgbImage,
    graded: &GradedSheet,
    answer_key: &AnswerKey,
    font: Option<&Font>,
) {
    let scale = Scale::uniform(20.0);

    for scored in &graded.questions {
        for option in &scored.options {
            draw_hollow_rect_mut(canvas, option.bounds, DARK_BLUE);
        }

        if let Some(correct) = answer_key.correct_option(scored.question) {
            if let Some(option) = scored.options.get(correct) {
                let color = if scored.selected == Some(correct) {
                    GREEN
                } else {
                    RED
                };
                draw_hollow_rect_mut(canvas, option.bounds, color);
            }
        }

        if let Some(font) = font {
            for option in &scored.options {
                let fill_text = option.fill_count.to_string();
                let (text_width, _) = text_size(scale, font, fill_text.as_str());
                let center = center_of_rect(&option.bounds);
                draw_text_with_background_mut(
                    canvas,
                    &fill_text,
                    center.x.round() as i32 - text_width / 2,
                    option.bounds.bottom() + 5,
                    scale,
                    font,
                    DARK_GREEN,
                    WHITE_RGB,
                );
            }
        }
    }

    if let Some(font) = font {
        let score_text = format!(
            "Score: {}/{}",
            graded.result.score, graded.result.total_questions
        );
        draw_text_with_background_mut(canvas, &score_text, 50, 50, scale, font, GREEN, WHITE_RGB);
    }
}

fn draw_text_with_background_mut(
    canvas: &mut RgbImage,
    text: &str,
    x: i32,
    y: i32,
    scale: Scale,
    font: &Font,
    text_color: image::Rgb<u8>,
    background_color: image::Rgb<u8>,
) {
    let (text_width, text_height) = text_size(scale, font, text);
    draw_filled_rect_mut(
        canvas,
        Rect::at(x, y).of_size(text_width as u32, text_height as u32),
        background_color,
    );
    draw_text_mut(canvas, text_color, x, y, scale, font, text);
}
