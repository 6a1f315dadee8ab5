use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::survey;

/// Every trip spreadsheet's title starts with this, which is how trips are
/// found again in a user's drive.
pub const TITLE_PREFIX: &str = "Trip Planner: ";

/// Sheet holding the trip's own details.
pub const DETAILS_SHEET: &str = "Details";
/// Sheet holding the idea board.
pub const SURVEY_SHEET: &str = "Survey";

pub const DETAILS_HEADER: [&str; DETAILS_WIDTH] =
    ["Trip Name", "Destination", "Start Date", "End Date", "Created By"];

pub const DETAILS_WIDTH: usize = 5;
const DATE_FORMAT: &str = "%Y-%m-%d";

/// A trip, as stored in the second row of its `Details` sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trip {
    pub name: String,
    pub destination: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub created_by: String,
}

impl Trip {
    /// Spreadsheet title for this trip.
    pub fn title(&self) -> String {
        title_for(&self.name)
    }

    pub fn to_cells(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.destination.clone(),
            format_date(self.start_date),
            format_date(self.end_date),
            self.created_by.clone(),
        ]
    }

    /// Read a trip back from its row. Missing trailing cells read as empty and
    /// dates that don't parse read as `None`.
    pub fn from_cells(cells: &[String]) -> Self {
        let cell = |i: usize| cells.get(i).map(|c| c.trim().to_string()).unwrap_or_default();
        Self {
            name: cell(0),
            destination: cell(1),
            start_date: parse_date(&cell(2)),
            end_date: parse_date(&cell(3)),
            created_by: cell(4),
        }
    }
}

/// Spreadsheet title for a trip with the given name.
pub fn title_for(name: &str) -> String {
    format!("{TITLE_PREFIX}{name}")
}

/// Recover a trip name from a spreadsheet title, if it is one of ours.
pub fn name_from_title(title: &str) -> Option<&str> {
    title.strip_prefix(TITLE_PREFIX).filter(|name| !name.is_empty())
}

/// The sheets every new trip spreadsheet is created with, and their headers.
pub fn sheet_templates() -> Vec<(&'static str, Vec<String>)> {
    vec![
        (DETAILS_SHEET, header(&DETAILS_HEADER)),
        (SURVEY_SHEET, header(&survey::row::HEADER)),
    ]
}

fn header(cells: &[&str]) -> Vec<String> {
    cells.iter().map(|c| c.to_string()).collect()
}

fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format(DATE_FORMAT).to_string())
        .unwrap_or_default()
}

fn parse_date(cell: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(cell, DATE_FORMAT).ok()
}
