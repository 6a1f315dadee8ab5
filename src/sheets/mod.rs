//! Access to the spreadsheet service that holds all persistent state.
//!
//! Writes are whole-range overwrites with last-write-wins semantics: there is
//! no concurrency token, so two clients doing read-modify-write on the same
//! range can silently lose each other's changes.

use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::sync::Arc;

use rocket::{
    request::{self, FromRequest, Request},
    State,
};
use serde::{Deserialize, Serialize};

use crate::error::Result;

mod google;
mod memory;

pub use google::{GoogleSheets, DEFAULT_DRIVE_API_URL, DEFAULT_SHEETS_API_URL};
pub use memory::InMemorySheets;

/// Raw table contents: rows of cells.
pub type Table = Vec<Vec<String>>;

/// Who is calling the spreadsheet service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    /// OAuth bearer token issued by the identity provider.
    pub access_token: String,
    /// The caller's email, used to decide ownership and access.
    pub email: String,
}

/// A rectangular block of a sheet: every row from `first_row` down, `width`
/// columns wide starting at column A.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SheetRange {
    pub sheet: &'static str,
    /// 1-based, as in A1 notation.
    pub first_row: usize,
    pub width: usize,
    /// Limit on the number of rows, if any.
    pub height: Option<usize>,
}

impl SheetRange {
    /// An open-ended range from `first_row` to the bottom of the sheet.
    pub const fn rows_from(sheet: &'static str, first_row: usize, width: usize) -> Self {
        Self {
            sheet,
            first_row,
            width,
            height: None,
        }
    }

    /// A range of exactly `height` rows.
    pub const fn rows(sheet: &'static str, first_row: usize, width: usize, height: usize) -> Self {
        Self {
            sheet,
            first_row,
            width,
            height: Some(height),
        }
    }
}

/// A1 notation, e.g. `Survey!A2:G` or `Details!A2:E2`.
impl Display for SheetRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let last_column = column_name(self.width.max(1));
        write!(f, "{}!A{}:{}", self.sheet, self.first_row, last_column)?;
        if let Some(height) = self.height {
            write!(f, "{}", self.first_row + height.max(1) - 1)?;
        }
        Ok(())
    }
}

/// Spreadsheet column letters for a 1-based column number.
fn column_name(mut column: usize) -> String {
    let mut name = Vec::new();
    while column > 0 {
        let rem = (column - 1) % 26;
        name.push(b'A' + rem as u8);
        column = (column - 1) / 26;
    }
    name.reverse();
    String::from_utf8(name).unwrap_or_default()
}

/// A spreadsheet file visible to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpreadsheetFile {
    pub id: String,
    pub title: String,
    pub owned_by_me: bool,
}

/// A new sheet: its name and header row.
pub type SheetTemplate = (&'static str, Vec<String>);

/// The operations the app needs from a spreadsheet service.
///
/// `read_rows` may omit trailing empty cells and trailing empty rows, as the
/// Google API does; callers pad with [`pad_row`].
#[rocket::async_trait]
pub trait SheetStore: Send + Sync {
    async fn read_rows(
        &self,
        auth: &Credentials,
        spreadsheet_id: &str,
        range: SheetRange,
    ) -> Result<Table>;

    /// Overwrite the range starting at its first row. Rows below the written
    /// block are left as they are.
    async fn write_rows(
        &self,
        auth: &Credentials,
        spreadsheet_id: &str,
        range: SheetRange,
        rows: Table,
    ) -> Result<()>;

    /// Add rows after the last non-empty row of the range's sheet.
    async fn append_rows(
        &self,
        auth: &Credentials,
        spreadsheet_id: &str,
        range: SheetRange,
        rows: Table,
    ) -> Result<()>;

    /// Create a spreadsheet owned by the caller, returning its ID.
    async fn create_spreadsheet(
        &self,
        auth: &Credentials,
        title: &str,
        sheets: Vec<SheetTemplate>,
    ) -> Result<String>;

    /// Spreadsheets visible to the caller whose title starts with `title_prefix`.
    async fn list_spreadsheets(
        &self,
        auth: &Credentials,
        title_prefix: &str,
    ) -> Result<Vec<SpreadsheetFile>>;

    /// Give `email` write access to the spreadsheet.
    async fn share(&self, auth: &Credentials, spreadsheet_id: &str, email: &str) -> Result<()>;
}

/// Extend a row with empty cells up to `width`. Longer rows are left alone.
pub fn pad_row(mut row: Vec<String>, width: usize) -> Vec<String> {
    if row.len() < width {
        row.resize(width, String::new());
    }
    row
}

/// The spreadsheet service in use, held in managed state.
#[derive(Clone)]
pub struct Sheets(Arc<dyn SheetStore>);

impl Sheets {
    pub fn new(store: impl SheetStore + 'static) -> Self {
        Self(Arc::new(store))
    }
}

impl Deref for Sheets {
    type Target = dyn SheetStore;

    fn deref(&self) -> &Self::Target {
        &*self.0
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for Sheets {
    type Error = ();

    /// Get the spreadsheet service from managed state.
    ///
    /// Panics iff [`Sheets`] is not managed by [`rocket::Rocket`].
    async fn from_request(req: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let sheets = req.guard::<&State<Sheets>>().await.unwrap();
        request::Outcome::Success(sheets.inner().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a1_notation() {
        assert_eq!(SheetRange::rows_from("Survey", 2, 7).to_string(), "Survey!A2:G");
        assert_eq!(SheetRange::rows("Details", 2, 5, 1).to_string(), "Details!A2:E2");
        assert_eq!(SheetRange::rows("Details", 1, 5, 3).to_string(), "Details!A1:E3");
    }

    #[test]
    fn column_names() {
        assert_eq!(column_name(1), "A");
        assert_eq!(column_name(7), "G");
        assert_eq!(column_name(26), "Z");
        assert_eq!(column_name(27), "AA");
        assert_eq!(column_name(52), "AZ");
        assert_eq!(column_name(703), "AAA");
    }

    #[test]
    fn padding() {
        let row = pad_row(vec!["Q".to_string(), "A".to_string()], 4);
        assert_eq!(row, vec!["Q", "A", "", ""]);
        let row = pad_row(vec!["a".to_string(); 5], 3);
        assert_eq!(row.len(), 5);
    }
}
