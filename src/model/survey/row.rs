use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of cells in a survey row.
pub const ROW_WIDTH: usize = 7;

/// Header written above the survey rows when a trip spreadsheet is created.
pub const HEADER: [&str; ROW_WIDTH] = [
    "Question", "Option", "Details", "Link", "Image", "Voters", "Creator",
];

/// Delimiter between names in a voters cell.
const VOTER_DELIMITER: char = ',';

/// One fixed-width survey row.
///
/// A row whose `question` cell is non-empty starts a new question; every
/// following row up to the next such row is an extra option of it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct Row {
    pub question: String,
    pub label: String,
    pub details: String,
    pub link: String,
    pub image: String,
    pub voters: String,
    pub creator: String,
}

impl Row {
    /// Does this row begin a new question?
    pub fn is_question_start(&self) -> bool {
        !self.question.is_empty()
    }

    /// A row with neither a question nor an option label carries nothing.
    pub fn is_padding(&self) -> bool {
        self.question.is_empty() && self.label.is_empty()
    }

    /// Build a row from raw cells, rejecting anything that isn't exactly
    /// [`ROW_WIDTH`] wide.
    pub fn from_cells(cells: Vec<String>) -> Result<Self, RowError> {
        let found = cells.len();
        let [question, label, details, link, image, voters, creator]: [String; ROW_WIDTH] = cells
            .try_into()
            .map_err(|_| RowError::Width {
                expected: ROW_WIDTH,
                found,
            })?;
        Ok(Self {
            question,
            label,
            details,
            link,
            image,
            voters,
            creator,
        })
    }

    /// Flatten back into raw cells in column order.
    pub fn into_cells(self) -> Vec<String> {
        vec![
            self.question,
            self.label,
            self.details,
            self.link,
            self.image,
            self.voters,
            self.creator,
        ]
    }

    /// The names in this row's voters cell.
    pub fn voter_list(&self) -> Vec<String> {
        decode_voters(&self.voters)
    }

    /// Replace this row's voters cell.
    pub fn set_voter_list(&mut self, voters: &[String]) {
        self.voters = encode_voters(voters);
    }
}

impl TryFrom<Vec<String>> for Row {
    type Error = RowError;

    fn try_from(cells: Vec<String>) -> Result<Self, Self::Error> {
        Self::from_cells(cells)
    }
}

impl From<Row> for Vec<String> {
    fn from(row: Row) -> Self {
        row.into_cells()
    }
}

/// Convert a whole table of raw cells into rows.
pub fn rows_from_cells(table: Vec<Vec<String>>) -> Result<Vec<Row>, RowError> {
    table.into_iter().map(Row::from_cells).collect()
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RowError {
    #[error("survey row must have exactly {expected} cells, found {found}")]
    Width { expected: usize, found: usize },
}

/// Join voter names into a single cell.
///
/// Names are joined verbatim; a name containing the delimiter will not survive
/// [`decode_voters`]. [`crate::model::user::VoterId`] refuses such names.
pub fn encode_voters<S: AsRef<str>>(voters: &[S]) -> String {
    voters
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(&VOTER_DELIMITER.to_string())
}

/// Split a voters cell into names, trimming whitespace and skipping blanks.
pub fn decode_voters(cell: &str) -> Vec<String> {
    cell.split(VOTER_DELIMITER)
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}
