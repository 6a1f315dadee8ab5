use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::trip::{name_from_title, Trip};
use crate::sheets::SpreadsheetFile;

use super::question::QuestionView;

/// A new trip as submitted by a client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripSpec {
    pub name: String,
    pub destination: String,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

impl TripSpec {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::bad_request("trip name is empty"));
        }
        if self.destination.trim().is_empty() {
            return Err(Error::bad_request("destination is empty"));
        }
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if end < start {
                return Err(Error::bad_request(format!(
                    "trip ends ({end}) before it starts ({start})"
                )));
            }
        }
        Ok(())
    }

    /// The trip this spec describes, created by `created_by`.
    pub fn into_trip(self, created_by: &str) -> Trip {
        Trip {
            name: self.name.trim().to_string(),
            destination: self.destination.trim().to_string(),
            start_date: self.start_date,
            end_date: self.end_date,
            created_by: created_by.to_string(),
        }
    }
}

/// One entry in the trip list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripSummary {
    /// Spreadsheet ID, used in every trip URL.
    pub id: String,
    pub name: String,
    pub is_owner: bool,
}

impl TripSummary {
    /// Summarise a spreadsheet, if it is a trip.
    pub fn from_file(file: SpreadsheetFile) -> Option<Self> {
        let name = name_from_title(&file.title)?.to_string();
        Some(Self {
            id: file.id,
            name,
            is_owner: file.owned_by_me,
        })
    }
}

/// Everything about a trip: its details and its board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripDetails {
    pub id: String,
    #[serde(flatten)]
    pub trip: Trip,
    pub questions: Vec<QuestionView>,
}

/// A collaborator to share a trip with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareRequest {
    pub email: String,
}

impl ShareRequest {
    pub fn validate(&self) -> Result<()> {
        let email = self.email.trim();
        match email.split_once('@') {
            Some((user, domain)) if !user.is_empty() && !domain.is_empty() => Ok(()),
            _ => Err(Error::bad_request(format!("not an email address: {email:?}"))),
        }
    }
}

/// Example data for tests.
#[cfg(test)]
mod examples {
    use super::*;

    impl TripSpec {
        pub fn example() -> Self {
            let trip = Trip::example();
            Self {
                name: trip.name,
                destination: trip.destination,
                start_date: trip.start_date,
                end_date: trip.end_date,
            }
        }
    }
}
