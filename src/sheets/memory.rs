use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use rocket::tokio::sync::RwLock;

use crate::error::{Error, Result};

use super::{Credentials, SheetRange, SheetStore, SheetTemplate, SpreadsheetFile, Table};

/// A spreadsheet service kept entirely in memory.
///
/// Mirrors the Google API closely enough to exercise the rest of the app:
/// reads drop trailing empty cells and rows, writes overwrite in place, and
/// anyone other than the owner or a collaborator gets a 404.
#[derive(Debug, Clone, Default)]
pub struct InMemorySheets {
    inner: Arc<RwLock<Drive>>,
}

#[derive(Debug, Default)]
struct Drive {
    next_id: usize,
    files: BTreeMap<String, Spreadsheet>,
}

#[derive(Debug, Clone)]
struct Spreadsheet {
    title: String,
    owner: String,
    collaborators: HashSet<String>,
    sheets: HashMap<String, Table>,
}

impl Spreadsheet {
    fn can_access(&self, email: &str) -> bool {
        self.owner == email || self.collaborators.contains(email)
    }

    fn sheet_mut(&mut self, name: &str) -> Result<&mut Table> {
        self.sheets.get_mut(name).ok_or_else(|| Error::Sheets {
            status: 400,
            message: format!("Unable to parse range: {name}"),
        })
    }
}

impl Drive {
    fn file(&self, auth: &Credentials, id: &str) -> Result<&Spreadsheet> {
        self.files
            .get(id)
            .filter(|file| file.can_access(&auth.email))
            .ok_or_else(|| file_not_found(id))
    }

    fn file_mut(&mut self, auth: &Credentials, id: &str) -> Result<&mut Spreadsheet> {
        self.files
            .get_mut(id)
            .filter(|file| file.can_access(&auth.email))
            .ok_or_else(|| file_not_found(id))
    }
}

fn file_not_found(id: &str) -> Error {
    Error::Sheets {
        status: 404,
        message: format!("File not found: {id}"),
    }
}

fn is_blank(row: &[String]) -> bool {
    row.iter().all(String::is_empty)
}

impl InMemorySheets {
    /// Raw contents of one sheet, for inspecting state in tests.
    pub async fn sheet(&self, spreadsheet_id: &str, sheet: &str) -> Option<Table> {
        let drive = self.inner.read().await;
        drive.files.get(spreadsheet_id)?.sheets.get(sheet).cloned()
    }
}

#[rocket::async_trait]
impl SheetStore for InMemorySheets {
    async fn read_rows(
        &self,
        auth: &Credentials,
        spreadsheet_id: &str,
        range: SheetRange,
    ) -> Result<Table> {
        let drive = self.inner.read().await;
        let file = drive.file(auth, spreadsheet_id)?;
        let sheet = file.sheets.get(range.sheet).ok_or_else(|| Error::Sheets {
            status: 400,
            message: format!("Unable to parse range: {range}"),
        })?;

        let skip = range.first_row.saturating_sub(1);
        let take = range.height.unwrap_or(usize::MAX);
        let mut rows: Table = sheet
            .iter()
            .skip(skip)
            .take(take)
            .map(|row| {
                let mut row: Vec<String> = row.iter().take(range.width).cloned().collect();
                while row.last().map_or(false, String::is_empty) {
                    row.pop();
                }
                row
            })
            .collect();
        while rows.last().map_or(false, |row| row.is_empty()) {
            rows.pop();
        }
        Ok(rows)
    }

    async fn write_rows(
        &self,
        auth: &Credentials,
        spreadsheet_id: &str,
        range: SheetRange,
        rows: Table,
    ) -> Result<()> {
        let mut drive = self.inner.write().await;
        let sheet = drive.file_mut(auth, spreadsheet_id)?.sheet_mut(range.sheet)?;

        let start = range.first_row.saturating_sub(1);
        if sheet.len() < start + rows.len() {
            sheet.resize(start + rows.len(), Vec::new());
        }
        for (target, row) in sheet[start..].iter_mut().zip(rows) {
            *target = row;
        }
        Ok(())
    }

    async fn append_rows(
        &self,
        auth: &Credentials,
        spreadsheet_id: &str,
        range: SheetRange,
        rows: Table,
    ) -> Result<()> {
        let mut drive = self.inner.write().await;
        let sheet = drive.file_mut(auth, spreadsheet_id)?.sheet_mut(range.sheet)?;

        let end = sheet
            .iter()
            .rposition(|row| !is_blank(row))
            .map_or(0, |last| last + 1)
            .max(range.first_row.saturating_sub(1));
        sheet.truncate(end);
        sheet.resize(end, Vec::new());
        sheet.extend(rows);
        Ok(())
    }

    async fn create_spreadsheet(
        &self,
        auth: &Credentials,
        title: &str,
        sheets: Vec<SheetTemplate>,
    ) -> Result<String> {
        let mut drive = self.inner.write().await;
        drive.next_id += 1;
        let id = format!("memory-sheet-{}", drive.next_id);
        let file = Spreadsheet {
            title: title.to_string(),
            owner: auth.email.clone(),
            collaborators: HashSet::new(),
            sheets: sheets
                .into_iter()
                .map(|(name, header)| (name.to_string(), vec![header]))
                .collect(),
        };
        drive.files.insert(id.clone(), file);
        Ok(id)
    }

    async fn list_spreadsheets(
        &self,
        auth: &Credentials,
        title_prefix: &str,
    ) -> Result<Vec<SpreadsheetFile>> {
        let drive = self.inner.read().await;
        let files = drive
            .files
            .iter()
            .filter(|(_, file)| file.can_access(&auth.email) && file.title.starts_with(title_prefix))
            .map(|(id, file)| SpreadsheetFile {
                id: id.clone(),
                title: file.title.clone(),
                owned_by_me: file.owner == auth.email,
            })
            .collect();
        Ok(files)
    }

    async fn share(&self, auth: &Credentials, spreadsheet_id: &str, email: &str) -> Result<()> {
        let mut drive = self.inner.write().await;
        let file = drive.file_mut(auth, spreadsheet_id)?;
        if email != file.owner {
            file.collaborators.insert(email.to_string());
        }
        Ok(())
    }
}
