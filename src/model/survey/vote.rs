use std::ops::Range;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::user::VoterId;

use super::row::Row;

/// How a vote interacts with the voter's other picks on the same question.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VotePolicy {
    /// Each option is toggled independently.
    #[default]
    MultiSelect,
    /// Radio-button semantics: voting clears the voter from every other option
    /// of the question first. Voting again for the same option keeps the vote.
    SingleChoice,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VoteError {
    #[error("no option {option} on question {question}")]
    IndexOutOfRange { question: usize, option: usize },
}

/// Row indices of the `question_index`-th question's run.
pub(crate) fn question_run(rows: &[Row], question_index: usize) -> Option<Range<usize>> {
    let mut starts = rows
        .iter()
        .enumerate()
        .filter(|(_, row)| row.is_question_start())
        .map(|(i, _)| i)
        .skip(question_index);
    let start = starts.next()?;
    let end = starts.next().unwrap_or(rows.len());
    Some(start..end)
}

/// Row offset, within its question's run, of the `option_index`-th option as
/// [`decode`](super::decode) numbers them. Padding rows inside the run hold no
/// option and are skipped.
pub(crate) fn option_offset(
    rows: &[Row],
    question_index: usize,
    option_index: usize,
) -> Option<usize> {
    let run = question_run(rows, question_index)?;
    let start = run.start;
    run.filter(|&i| !rows[i].is_padding())
        .nth(option_index)
        .map(|i| i - start)
}

/// Toggle `voter`'s vote on one option, returning the rewritten table.
///
/// `option_index` counts rows from the question's first row. Only voters cells
/// change; all other cells and the row order are passed through. A voters cell
/// that is touched is re-encoded, so hand-typed spacing such as `"Alice, Bob"`
/// comes back as `"Alice,Bob"` with the same voters. The caller writes the
/// whole table back, so two concurrent votes race and the later write wins.
pub fn toggle_vote(
    rows: &[Row],
    question_index: usize,
    option_index: usize,
    voter: &VoterId,
    policy: VotePolicy,
) -> Result<Vec<Row>, VoteError> {
    let out_of_range = VoteError::IndexOutOfRange {
        question: question_index,
        option: option_index,
    };
    let run = question_run(rows, question_index).ok_or_else(|| out_of_range.clone())?;
    let target = run
        .start
        .checked_add(option_index)
        .filter(|target| run.contains(target) && !rows[*target].is_padding())
        .ok_or(out_of_range)?;

    let mut rows = rows.to_vec();
    match policy {
        VotePolicy::MultiSelect => {
            let mut voters = rows[target].voter_list();
            if voters.iter().any(|name| voter == name) {
                voters.retain(|name| voter != name);
            } else {
                voters.push(voter.to_string());
            }
            rows[target].set_voter_list(&voters);
        }
        VotePolicy::SingleChoice => {
            for row in &mut rows[run] {
                let voters = row.voter_list();
                if voters.iter().any(|name| voter == name) {
                    let remaining: Vec<_> =
                        voters.into_iter().filter(|name| voter != name).collect();
                    row.set_voter_list(&remaining);
                }
            }
            let mut voters = rows[target].voter_list();
            voters.push(voter.to_string());
            rows[target].set_voter_list(&voters);
        }
    }
    Ok(rows)
}
