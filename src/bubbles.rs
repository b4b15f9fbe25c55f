use image::GrayImage;
use imageproc::contours::{find_contours, BorderType, Contour};
use imageproc::drawing::draw_polygon_mut;
use imageproc::point::Point;
use imageproc::rect::Rect;
use logging_timer::time;

use crate::geometry::{aspect_ratio, bounding_rect_of_points};
use crate::image_utils::{count_pixels, BLACK, WHITE};
use crate::sheet::SheetGeometry;

/// A connected ink region whose shape is consistent with an answer bubble.
#[derive(Debug, Clone)]
pub struct BubbleCandidate {
    pub bounds: Rect,
    pub points: Vec<Point<i32>>,
}

/// One question's bubble candidates, ordered left to right.
pub type QuestionRow = Vec<BubbleCandidate>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredBubble {
    pub bounds: Rect,
    pub fill_count: u32,
}

/// The fill measurement for one question row and the option it resolves to,
/// if any bubble is filled beyond the threshold.
#[derive(Debug, Clone)]
pub struct ScoredQuestion {
    pub question: usize,
    pub options: Vec<ScoredBubble>,
    pub selected: Option<usize>,
}

/// Finds bubble-shaped candidates in a binary ink mask.
///
/// Only outermost contours are considered, so shapes nested inside a bubble
/// (a pen stroke's hole, for example) are ignored.
#[time]
pub fn find_bubble_candidates(mask: &GrayImage, geometry: &SheetGeometry) -> Vec<BubbleCandidate> {
    let contours: Vec<Contour<i32>> = find_contours(mask);
    contours
        .iter()
        .filter(|contour| contour.border_type == BorderType::Outer && contour.parent.is_none())
        .filter_map(|contour| {
            let bounds = bounding_rect_of_points(&contour.points);
            if rect_could_be_bubble(geometry, &bounds) {
                Some(BubbleCandidate {
                    bounds,
                    points: contour.points.clone(),
                })
            } else {
                None
            }
        })
        .collect()
}

/// Determines whether a rect could be a bubble based on its size and aspect
/// ratio. This excludes text, ruling lines, and sheet borders.
pub fn rect_could_be_bubble(geometry: &SheetGeometry, rect: &Rect) -> bool {
    let ratio = aspect_ratio(rect);
    rect.width() >= geometry.min_bubble_size.width
        && rect.height() >= geometry.min_bubble_size.height
        && ratio >= geometry.min_aspect_ratio
        && ratio <= geometry.max_aspect_ratio
}

/// Partitions candidates into question rows: top-to-bottom by bounding box
/// top edge, then left-to-right within each row.
///
/// Assumes bubbles in the same row have closely clustered y-coordinates, so
/// the y-sort keeps each row's members contiguous.
#[time]
pub fn group_candidates_into_rows(
    mut candidates: Vec<BubbleCandidate>,
    geometry: &SheetGeometry,
) -> Vec<QuestionRow> {
    candidates.sort_by_key(|candidate| candidate.bounds.top());
    candidates
        .chunks(geometry.options_per_question as usize)
        .map(|chunk| {
            let mut row = chunk.to_vec();
            row.sort_by_key(|candidate| candidate.bounds.left());
            row
        })
        .collect()
}

/// Counts mask foreground pixels inside the candidate's filled outline.
pub fn bubble_fill_count(mask: &GrayImage, candidate: &BubbleCandidate) -> u32 {
    let bounds = candidate.bounds;
    let mut stencil = GrayImage::new(bounds.width(), bounds.height());
    let mut outline: Vec<Point<i32>> = candidate
        .points
        .iter()
        .map(|point| Point::new(point.x - bounds.left(), point.y - bounds.top()))
        .collect();
    if outline.len() > 1 && outline.first() == outline.last() {
        outline.pop();
    }
    draw_polygon_mut(&mut stencil, &outline, WHITE);

    // Keep only the stencil pixels that are also inked in the mask.
    for (x, y, pixel) in stencil.enumerate_pixels_mut() {
        if *pixel != WHITE {
            continue;
        }
        let mask_x = (bounds.left() + x as i32) as u32;
        let mask_y = (bounds.top() + y as i32) as u32;
        if *mask.get_pixel(mask_x, mask_y) != WHITE {
            *pixel = BLACK;
        }
    }
    count_pixels(&stencil, &WHITE)
}

/// Scores one question row and selects the most-filled bubble, if any bubble
/// is filled beyond the geometry's fill threshold. The leftmost bubble wins
/// an exact tie.
pub fn score_question_row(
    mask: &GrayImage,
    question: usize,
    row: &QuestionRow,
    geometry: &SheetGeometry,
) -> ScoredQuestion {
    let options: Vec<ScoredBubble> = row
        .iter()
        .map(|candidate| ScoredBubble {
            bounds: candidate.bounds,
            fill_count: bubble_fill_count(mask, candidate),
        })
        .collect();

    let mut best: Option<(u32, usize)> = None;
    for (option_index, scored) in options.iter().enumerate() {
        if best.map_or(true, |(best_fill, _)| scored.fill_count > best_fill) {
            best = Some((scored.fill_count, option_index));
        }
    }

    let selected = best
        .filter(|(fill_count, _)| *fill_count > geometry.fill_threshold)
        .map(|(_, option_index)| option_index);

    ScoredQuestion {
        question,
        options,
        selected,
    }
}
