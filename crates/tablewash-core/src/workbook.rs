//! Workbook implementation

use crate::error::{Error, Result};
use crate::worksheet::Worksheet;
use crate::MAX_SHEET_NAME_LEN;

/// An in-memory workbook holding one or more worksheets
#[derive(Debug, Default)]
pub struct Workbook {
    worksheets: Vec<Worksheet>,
}

impl Workbook {
    /// Create a new workbook with a single "Sheet1" worksheet
    pub fn new() -> Self {
        let mut wb = Self::empty();
        wb.worksheets.push(Worksheet::new("Sheet1"));
        wb
    }

    /// Create a workbook with no worksheets
    pub fn empty() -> Self {
        Self {
            worksheets: Vec::new(),
        }
    }

    /// Number of worksheets
    pub fn sheet_count(&self) -> usize {
        self.worksheets.len()
    }

    /// Get a worksheet by index
    pub fn worksheet(&self, index: usize) -> Option<&Worksheet> {
        self.worksheets.get(index)
    }

    /// Get a mutable worksheet by index
    pub fn worksheet_mut(&mut self, index: usize) -> Option<&mut Worksheet> {
        self.worksheets.get_mut(index)
    }

    /// Get a worksheet by name
    pub fn worksheet_by_name(&self, name: &str) -> Option<&Worksheet> {
        self.worksheets.iter().find(|s| s.name() == name)
    }

    /// Get a mutable worksheet by name
    pub fn worksheet_by_name_mut(&mut self, name: &str) -> Option<&mut Worksheet> {
        self.worksheets.iter_mut().find(|s| s.name() == name)
    }

    /// Iterate over worksheets in order
    pub fn worksheets(&self) -> impl Iterator<Item = &Worksheet> {
        self.worksheets.iter()
    }

    /// Sheet names in workbook order
    pub fn sheet_names(&self) -> Vec<&str> {
        self.worksheets.iter().map(|s| s.name()).collect()
    }

    /// Add a new empty worksheet with the given name
    pub fn add_worksheet<S: Into<String>>(&mut self, name: S) -> Result<&mut Worksheet> {
        let name = name.into();
        self.validate_sheet_name(&name)?;
        self.worksheets.push(Worksheet::new(name));
        // Just pushed, so last() is always present
        Ok(self.worksheets.last_mut().unwrap())
    }

    /// Add an existing worksheet
    pub fn add_existing_worksheet(&mut self, sheet: Worksheet) -> Result<()> {
        self.validate_sheet_name(sheet.name())?;
        self.worksheets.push(sheet);
        Ok(())
    }

    /// Rename a worksheet
    pub fn rename_worksheet(&mut self, index: usize, name: &str) -> Result<()> {
        if index >= self.worksheets.len() {
            return Err(Error::SheetNotFound(index.to_string()));
        }
        let current = self.worksheets[index].name().to_string();
        if !current.eq_ignore_ascii_case(name) {
            self.validate_sheet_name(name)?;
        }
        self.worksheets[index].set_name(name);
        Ok(())
    }

    fn validate_sheet_name(&self, name: &str) -> Result<()> {
        if name.is_empty() {
            return Err(Error::InvalidSheetName("name is empty".into()));
        }
        if name.chars().count() > MAX_SHEET_NAME_LEN {
            return Err(Error::InvalidSheetName(format!(
                "name '{}' exceeds {} characters",
                name, MAX_SHEET_NAME_LEN
            )));
        }
        // Characters Excel forbids in sheet names
        const INVALID: [char; 7] = ['\\', '/', '?', '*', '[', ']', ':'];
        if name.chars().any(|c| INVALID.contains(&c)) {
            return Err(Error::InvalidSheetName(format!(
                "name '{}' contains an invalid character",
                name
            )));
        }
        if self
            .worksheets
            .iter()
            .any(|s| s.name().eq_ignore_ascii_case(name))
        {
            return Err(Error::DuplicateSheetName(name.to_string()));
        }
        Ok(())
    }
}
