use thiserror::Error;
use tracing::debug;

use super::models::{Outcome, Prediction, PredictionKind, PredictionResult, ScoreMatch};
use crate::sport::Contestant;

/// Number of leading positions covered by a "drawn" flag
pub const DRAWN_BLOCK_SIZE: usize = 2;

#[derive(Debug, Error, PartialEq)]
pub enum GradingError {
    #[error("Outcome kind {outcome} cannot grade a {prediction} prediction")]
    OutcomeMismatch {
        prediction: &'static str,
        outcome: &'static str,
    },

    #[error("Selected choice {0:?} is not one of the offered choices")]
    UnknownChoice(String),
}

/// Compares a prediction with the official outcome of its scope.
///
/// Grading is a pure function of its inputs; storing the results through
/// [`Prediction::record_results`] makes repeated grading idempotent.
pub fn grade(prediction: &Prediction, outcome: &Outcome) -> Result<Vec<PredictionResult>, GradingError> {
    let results = match (&prediction.kind, outcome) {
        (
            PredictionKind::OrderedList { contestants, drawn },
            Outcome::Ranking {
                contestants: final_order,
                drawn: final_drawn,
            },
        ) => grade_ordered_list(contestants, *drawn, final_order, *final_drawn),
        (PredictionKind::Score { home, away }, Outcome::Score { home: h, away: a }) => {
            vec![PredictionResult::score(grade_score((*home, *away), (*h, *a)))]
        }
        (PredictionKind::Question { choices, selected, .. }, Outcome::Answer { choice }) => {
            if !choices.contains(selected) {
                return Err(GradingError::UnknownChoice(selected.clone()));
            }
            vec![PredictionResult::question(selected == choice)]
        }
        (kind, outcome) => {
            return Err(GradingError::OutcomeMismatch {
                prediction: kind.name(),
                outcome: outcome_name(outcome),
            })
        }
    };

    debug!(
        prediction_id = %prediction.id,
        results = results.len(),
        "Graded prediction"
    );
    Ok(results)
}

/// Grades each predicted position.
///
/// Outside the drawn block a position matches on exact placement. Inside it
/// (the first [`DRAWN_BLOCK_SIZE`] positions when either side is drawn) the
/// drawn flags must agree; when both are drawn any order within the block
/// counts.
fn grade_ordered_list(
    predicted: &[Contestant],
    drawn: bool,
    final_order: &[Contestant],
    final_drawn: bool,
) -> Vec<PredictionResult> {
    let block = if drawn || final_drawn {
        DRAWN_BLOCK_SIZE
    } else {
        0
    };
    let final_block = &final_order[..block.min(final_order.len())];

    predicted
        .iter()
        .enumerate()
        .map(|(index, contestant)| {
            let matched = if index < block {
                drawn == final_drawn && final_block.contains(contestant)
            } else {
                final_order.get(index) == Some(contestant)
            };
            PredictionResult::position(index as u32 + 1, matched)
        })
        .collect()
}

fn grade_score(predicted: (u32, u32), actual: (u32, u32)) -> ScoreMatch {
    if predicted == actual {
        ScoreMatch::Exact
    } else if predicted.0.cmp(&predicted.1) == actual.0.cmp(&actual.1) {
        ScoreMatch::Outcome
    } else {
        ScoreMatch::Miss
    }
}

fn outcome_name(outcome: &Outcome) -> &'static str {
    match outcome {
        Outcome::Ranking { .. } => "ranking",
        Outcome::Score { .. } => "score",
        Outcome::Answer { .. } => "answer",
    }
}
