//! Optical mark recognition for multiple-choice answer sheets.
//!
//! The pipeline turns an encoded sheet photograph into a grade: binarize the
//! image, find bubble-shaped ink regions, group them into question rows,
//! measure how filled each bubble is, and tally the selections against an
//! answer key. Every invocation is a pure function over its own buffers.

pub mod bubbles;
pub mod debug;
pub mod geometry;
pub mod grade;
pub mod image_utils;
pub mod sheet;

pub use grade::{grade_sheet, GradeSheetError, GradedSheet};
pub use sheet::{standard_sheet_geometry, AnswerKey, GradeResult, SheetGeometry};
