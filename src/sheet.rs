use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::Size;

/// Geometric and scoring constants for a scanned answer sheet.
///
/// These are fixed properties of the sheet format and the scoring algorithm,
/// passed into the pipeline as a value rather than read from globals.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SheetGeometry {
    pub options_per_question: u32,
    pub min_bubble_size: Size<u32>,
    pub min_aspect_ratio: f32,
    pub max_aspect_ratio: f32,
    /// Minimum number of inked pixels a bubble must contain, exclusive, for
    /// it to count as marked.
    pub fill_threshold: u32,
}

pub fn standard_sheet_geometry() -> SheetGeometry {
    SheetGeometry {
        options_per_question: 4,
        min_bubble_size: Size {
            width: 20,
            height: 20,
        },
        min_aspect_ratio: 0.9,
        max_aspect_ratio: 1.2,
        fill_threshold: 200,
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AnswerKeyParseError {
    #[error("answer key is empty")]
    Empty,

    #[error("answer {position} is not a number: {value:?}")]
    NotANumber { position: usize, value: String },

    #[error("answer {position} is out of range; options are numbered starting at 1")]
    OutOfRange { position: usize },
}

/// The correct option index for each question, in question order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerKey(Vec<usize>);

impl AnswerKey {
    pub fn new(correct_options: Vec<usize>) -> Self {
        Self(correct_options)
    }

    /// Parses a comma-separated list of 1-based option numbers, e.g.
    /// `"1,4,2,3"`, into zero-based option indexes keyed by position.
    pub fn parse(answers: &str) -> Result<Self, AnswerKeyParseError> {
        if answers.trim().is_empty() {
            return Err(AnswerKeyParseError::Empty);
        }

        let correct_options = answers
            .split(',')
            .enumerate()
            .map(|(position, answer)| {
                let number: usize = answer.trim().parse().map_err(|_| {
                    AnswerKeyParseError::NotANumber {
                        position,
                        value: answer.trim().to_string(),
                    }
                })?;
                if number == 0 {
                    return Err(AnswerKeyParseError::OutOfRange { position });
                }
                Ok(number - 1)
            })
            .collect::<Result<Vec<usize>, AnswerKeyParseError>>()?;

        Ok(Self(correct_options))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The correct option index for the given question, if the question is
    /// covered by this key.
    pub fn correct_option(&self, question: usize) -> Option<usize> {
        self.0.get(question).copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeResult {
    pub score: u32,
    pub total_questions: u32,
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn parses_one_based_answer_list() {
        let key = AnswerKey::parse("1,4,2,3").expect("key parses");
        assert_eq!(key, AnswerKey::new(vec![0, 3, 1, 2]));
        assert_eq!(key.len(), 4);
        assert_eq!(key.correct_option(1), Some(3));
        assert_eq!(key.correct_option(4), None);
    }

    #[test]
    fn parses_answers_with_whitespace() {
        let key = AnswerKey::parse(" 1 , 2 ,3").expect("key parses");
        assert_eq!(key, AnswerKey::new(vec![0, 1, 2]));
    }

    #[test]
    fn rejects_empty_key() {
        assert_eq!(AnswerKey::parse("  "), Err(AnswerKeyParseError::Empty));
    }

    #[test]
    fn rejects_non_numeric_answers() {
        assert_eq!(
            AnswerKey::parse("1,b,3"),
            Err(AnswerKeyParseError::NotANumber {
                position: 1,
                value: "b".to_string()
            })
        );
    }

    #[test]
    fn rejects_zero_as_an_answer() {
        assert_eq!(
            AnswerKey::parse("1,0"),
            Err(AnswerKeyParseError::OutOfRange { position: 1 })
        );
    }

    #[test]
    fn trailing_comma_is_a_format_error() {
        assert!(matches!(
            AnswerKey::parse("1,2,"),
            Err(AnswerKeyParseError::NotANumber { position: 2, .. })
        ));
    }

    proptest! {
        #[test]
        fn parses_any_one_based_list(options in prop::collection::vec(1usize..=9, 1..50)) {
            let answers = options
                .iter()
                .map(|option| option.to_string())
                .collect::<Vec<String>>()
                .join(",");
            let key = AnswerKey::parse(&answers).expect("valid key parses");
            prop_assert_eq!(key.len(), options.len());
            for (question, option) in options.iter().enumerate() {
                prop_assert_eq!(key.correct_option(question), Some(option - 1));
            }
        }
    }
}
