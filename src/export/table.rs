//! Tab-delimited export table

use csv::{QuoteStyle, Terminator, WriterBuilder};
use std::io::Write;
use std::path::Path;
use tracing::info;

use crate::error::{Result, SuiteError};

/// Default export destination
pub const DEFAULT_EXPORT_FILE: &str = "ExportedTests.csv";

pub const FULL_NAME_HEADER: &str = "FullName";
pub const KIND_HEADER: &str = "Kind";

/// In-memory export: a header and one row per leaf.
///
/// Cells are stored already rendered; value cells carry their quotes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExportTable {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl ExportTable {
    pub fn new(header: Vec<String>) -> Self {
        Self {
            header,
            rows: Vec::new(),
        }
    }

    pub(crate) fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Write the table as tab-delimited UTF-8 text.
    ///
    /// Header cells and the name and kind of each row are written raw, so
    /// they must not contain tabs or line breaks.
    pub fn write_to<W: Write>(&self, writer: W) -> Result<()> {
        self.check_raw_cells()?;

        let mut writer = WriterBuilder::new()
            .delimiter(b'\t')
            .quote_style(QuoteStyle::Never)
            .terminator(Terminator::Any(b'\n'))
            .flexible(true)
            .from_writer(writer);

        writer.write_record(&self.header)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer
            .flush()
            .map_err(|e| SuiteError::Csv(csv::Error::from(e)))?;
        Ok(())
    }

    fn check_raw_cells(&self) -> Result<()> {
        let raw = self
            .header
            .iter()
            .chain(self.rows.iter().flat_map(|row| row.iter().take(2)));
        for cell in raw {
            if cell.contains(['\t', '\n', '\r']) {
                return Err(SuiteError::UnsafeCell(cell.clone()));
            }
        }
        Ok(())
    }

    /// Render the table to a string
    pub fn to_tsv(&self) -> Result<String> {
        let mut buffer = Vec::new();
        self.write_to(&mut buffer)?;
        String::from_utf8(buffer).map_err(|e| {
            SuiteError::Csv(csv::Error::from(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                e,
            )))
        })
    }

    /// Write the table to `path`, creating parent directories as needed
    pub fn write_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| SuiteError::io(parent, e))?;
        }
        let file = std::fs::File::create(path).map_err(|e| SuiteError::io(path, e))?;
        self.write_to(std::io::BufWriter::new(file))?;

        info!("Saved export with {} rows at: '{}'", self.rows.len(), path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn table() -> ExportTable {
        let mut table = ExportTable::new(vec![
            FULL_NAME_HEADER.to_string(),
            KIND_HEADER.to_string(),
            "Category".to_string(),
        ]);
        table.push_row(vec![
            "A.B".to_string(),
            "TestMethod".to_string(),
            "\"x\ny\"".to_string(),
        ]);
        table.push_row(vec!["A.C".to_string(), "TestMethod".to_string()]);
        table
    }

    #[test]
    fn test_to_tsv() {
        let text = table().to_tsv().unwrap();
        assert_eq!(
            text,
            "FullName\tKind\tCategory\nA.B\tTestMethod\t\"x\ny\"\nA.C\tTestMethod\n"
        );
    }

    #[test]
    fn test_control_characters_in_names_rejected() {
        let mut table = table();
        table.push_row(vec!["A.M(\"x\ty\")".to_string(), "TestMethod".to_string()]);
        let err = table.to_tsv().unwrap_err();
        assert!(matches!(err, SuiteError::UnsafeCell(name) if name == "A.M(\"x\ty\")"));

        let header = ExportTable::new(vec![FULL_NAME_HEADER.to_string(), "Two\nLines".to_string()]);
        assert!(matches!(header.to_tsv(), Err(SuiteError::UnsafeCell(_))));
    }

    #[test]
    fn test_write_file_creates_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out").join(DEFAULT_EXPORT_FILE);

        table().write_file(&path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("FullName\tKind\tCategory\n"));
        assert_eq!(written.lines().filter(|l| l.starts_with("A.")).count(), 2);
    }
}
