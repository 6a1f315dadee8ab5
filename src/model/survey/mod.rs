//! The idea-board survey: how questions are laid out as spreadsheet rows, and
//! how votes rewrite those rows.

pub mod question;
pub mod row;
pub mod vote;

pub use question::{decode, encode, Question, QuestionOption};
pub use row::{decode_voters, encode_voters, rows_from_cells, Row, RowError, ROW_WIDTH};
pub use vote::{toggle_vote, VoteError, VotePolicy};
