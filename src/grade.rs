use image::GrayImage;
use logging_timer::time;
use thiserror::Error;

use crate::bubbles::{
    find_bubble_candidates, group_candidates_into_rows, score_question_row, BubbleCandidate,
    ScoredQuestion,
};
use crate::image_utils::binarize_sheet_image;
use crate::sheet::{AnswerKey, AnswerKeyParseError, GradeResult, SheetGeometry};

/// A fully scored sheet: the grade plus the per-question fill measurements
/// that produced it.
#[derive(Debug, Clone)]
pub struct GradedSheet {
    pub result: GradeResult,
    pub questions: Vec<ScoredQuestion>,
}

#[derive(Debug, Error)]
pub enum GradeSheetError {
    #[error("image data could not be decoded; the file may be corrupt or not a supported image format")]
    ImageDecode(#[source] image::ImageError),

    #[error("no bubbles were recognized; make sure the sheet is clear, well-lit, and properly aligned")]
    NoBubblesFound,

    #[error("an incomplete set of bubbles ({count}) was detected; every question must have {options_per_question} options")]
    IncompleteBubbleSet { count: usize, options_per_question: u32 },

    #[error("the sheet has {detected} questions but the answer key has {expected}")]
    AnswerKeyMismatch { detected: usize, expected: usize },

    #[error("invalid answer key: {0}")]
    AnswerKeyFormat(#[from] AnswerKeyParseError),
}

/// Decodes an encoded sheet image and produces its binary ink mask.
#[time]
pub fn binarize_sheet(image_bytes: &[u8]) -> Result<GrayImage, GradeSheetError> {
    let img = image::load_from_memory(image_bytes).map_err(GradeSheetError::ImageDecode)?;
    Ok(binarize_sheet_image(&img.into_luma8()))
}

/// Checks that the candidate set forms complete rows and that the apparent
/// question count matches the answer key.
fn validate_candidate_count(
    candidates: &[BubbleCandidate],
    answer_key: &AnswerKey,
    geometry: &SheetGeometry,
) -> Result<usize, GradeSheetError> {
    if candidates.is_empty() {
        return Err(GradeSheetError::NoBubblesFound);
    }

    let options_per_question = geometry.options_per_question as usize;
    if candidates.len() % options_per_question != 0 {
        return Err(GradeSheetError::IncompleteBubbleSet {
            count: candidates.len(),
            options_per_question: geometry.options_per_question,
        });
    }

    let detected = candidates.len() / options_per_question;
    if detected != answer_key.len() {
        return Err(GradeSheetError::AnswerKeyMismatch {
            detected,
            expected: answer_key.len(),
        });
    }

    Ok(detected)
}

/// Grades a scanned answer sheet against the answer key.
///
/// This is the whole pipeline: binarize, extract bubble candidates, group
/// them into question rows, measure fill, and tally the score. It is a pure
/// function of its inputs; each call owns its own buffers.
#[time]
pub fn grade_sheet(
    image_bytes: &[u8],
    answer_key: &AnswerKey,
    geometry: &SheetGeometry,
) -> Result<GradedSheet, GradeSheetError> {
    let mask = binarize_sheet(image_bytes)?;
    let candidates = find_bubble_candidates(&mask, geometry);
    validate_candidate_count(&candidates, answer_key, geometry)?;

    let rows = group_candidates_into_rows(candidates, geometry);
    let questions: Vec<ScoredQuestion> = rows
        .iter()
        .enumerate()
        .map(|(question, row)| score_question_row(&mask, question, row, geometry))
        .collect();

    let result = grade_scored_questions(&questions, answer_key);
    Ok(GradedSheet { result, questions })
}

/// Tallies the score: one point per question whose selected option matches
/// the answer key. Unanswered questions score nothing.
pub fn grade_scored_questions(questions: &[ScoredQuestion], answer_key: &AnswerKey) -> GradeResult {
    let score = questions
        .iter()
        .filter(|scored| match scored.selected {
            Some(option) => answer_key.correct_option(scored.question) == Some(option),
            None => false,
        })
        .count() as u32;

    GradeResult {
        score,
        total_questions: answer_key.len() as u32,
    }
}
