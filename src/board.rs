//! The idea board: a trip's survey, read from and written back to its sheet.
//!
//! Every mutation is read-modify-write over the whole survey range. There is
//! no locking, so concurrent edits to the same trip race and the last write
//! wins.

use crate::error::{Error, Result};
use crate::model::{
    survey::{
        self, toggle_vote,
        vote::{option_offset, question_run},
        Question, Row, VoteError, VotePolicy, ROW_WIDTH,
    },
    trip::SURVEY_SHEET,
    user::VoterId,
};
use crate::sheets::{pad_row, Credentials, SheetRange, Sheets};

/// Survey rows start below the header.
pub const SURVEY_RANGE: SheetRange = SheetRange::rows_from(SURVEY_SHEET, 2, ROW_WIDTH);

/// One trip's survey sheet, accessed as a particular user.
pub struct SurveyBoard<'a> {
    sheets: &'a Sheets,
    auth: &'a Credentials,
    spreadsheet_id: &'a str,
}

impl<'a> SurveyBoard<'a> {
    pub fn new(sheets: &'a Sheets, auth: &'a Credentials, spreadsheet_id: &'a str) -> Self {
        Self {
            sheets,
            auth,
            spreadsheet_id,
        }
    }

    /// All survey rows, padded out to full width.
    pub async fn rows(&self) -> Result<Vec<Row>> {
        let table = self
            .sheets
            .read_rows(self.auth, self.spreadsheet_id, SURVEY_RANGE)
            .await?;
        let rows: Vec<Row> = table
            .into_iter()
            .map(|cells| Row::from_cells(pad_row(cells, ROW_WIDTH)))
            .collect::<std::result::Result<_, _>>()?;
        Ok(rows)
    }

    pub async fn questions(&self) -> Result<Vec<Question>> {
        Ok(survey::decode(&self.rows().await?))
    }

    /// Append a question's rows after the existing survey.
    pub async fn add_question(&self, question: &Question) -> Result<()> {
        let table = question.to_rows().into_iter().map(Row::into_cells).collect();
        self.sheets
            .append_rows(self.auth, self.spreadsheet_id, SURVEY_RANGE, table)
            .await?;
        info!("Added question '{}' to {}", question.text, self.spreadsheet_id);
        Ok(())
    }

    /// Replace the `index`-th question in place.
    pub async fn replace_question(&self, index: usize, question: &Question) -> Result<()> {
        let rows = self.rows().await?;
        let run = question_run(&rows, index)
            .ok_or_else(|| Error::not_found(format!("question {index}")))?;
        let mut updated = rows.clone();
        updated.splice(run, question.to_rows());
        self.write(updated, rows.len()).await?;
        info!("Updated question {index} of {}", self.spreadsheet_id);
        Ok(())
    }

    /// Toggle `voter`'s vote on option `option` of question `question`, both
    /// numbered as [`questions`](Self::questions) returns them.
    pub async fn vote(
        &self,
        question: usize,
        option: usize,
        voter: &VoterId,
        policy: VotePolicy,
    ) -> Result<()> {
        let rows = self.rows().await?;
        // Blank rows someone typed into the sheet don't count as options.
        let offset = option_offset(&rows, question, option)
            .ok_or(VoteError::IndexOutOfRange { question, option })?;
        let updated = toggle_vote(&rows, question, offset, voter, policy)?;
        self.write(updated, rows.len()).await?;
        debug!("{voter} voted on {question}/{option} in {}", self.spreadsheet_id);
        Ok(())
    }

    /// Write the whole survey back. Writes don't clear what's below them, so a
    /// table that shrank is padded with blank rows over the stale tail.
    async fn write(&self, mut rows: Vec<Row>, previous_len: usize) -> Result<()> {
        if rows.len() < previous_len {
            rows.resize(previous_len, Row::default());
        }
        let table = rows.into_iter().map(Row::into_cells).collect();
        self.sheets
            .write_rows(self.auth, self.spreadsheet_id, SURVEY_RANGE, table)
            .await
    }
}
