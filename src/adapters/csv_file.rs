use crate::adapters::parse_rows;
use crate::domain::model::{EnrollmentRecord, Row, COLUMNS};
use crate::domain::ports::TabularStore;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// Enrollment rows kept in a local CSV file.
#[derive(Debug, Clone)]
pub struct CsvFileStore {
    path: PathBuf,
}

impl CsvFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn existing_header(&self) -> Result<Option<Vec<String>>> {
        let is_empty = match fs::metadata(&self.path) {
            Ok(meta) => meta.len() == 0,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => true,
            Err(e) => return Err(e.into()),
        };
        if is_empty {
            return Ok(None);
        }

        let mut rdr = csv::Reader::from_path(&self.path)?;
        Ok(Some(rdr.headers()?.iter().map(str::to_string).collect()))
    }

    /// 最後一行沒有換行符時回傳 true
    fn lacks_trailing_newline(&self) -> Result<bool> {
        let mut file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(e.into()),
        };
        if file.metadata()?.len() == 0 {
            return Ok(false);
        }

        let mut last = [0u8; 1];
        file.seek(SeekFrom::End(-1))?;
        file.read_exact(&mut last)?;
        Ok(!matches!(last[0], b'\n' | b'\r'))
    }
}

#[async_trait]
impl TabularStore for CsvFileStore {
    async fn read_all_rows(&self) -> Result<Vec<Row>> {
        // 檔案不存在視為空表
        let file = match fs::File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("{} does not exist yet, treating as empty", self.path.display());
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };
        parse_rows(file)
    }

    async fn append_row(&self, record: &EnrollmentRecord) -> Result<()> {
        let header = self.existing_header()?;
        let needs_newline = self.lacks_trailing_newline()?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        // 不能接在最後一筆紀錄後面
        if needs_newline {
            file.write_all(b"\n")?;
        }
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);

        // 依現有表頭的欄位順序寫入，新檔案先寫表頭
        match header {
            Some(columns) => {
                writer.write_record(columns.iter().map(|c| record.value(c)))?;
            }
            None => {
                writer.write_record(COLUMNS)?;
                writer.write_record(record.to_values())?;
            }
        }
        writer.flush()?;

        tracing::debug!("Appended PRN {} to {}", record.prn, self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{COLUMN_ELECTIVE_1, COLUMN_ELECTIVE_2, COLUMN_NAME, COLUMN_PRN};
    use tempfile::TempDir;

    fn record(prn: &str) -> EnrollmentRecord {
        EnrollmentRecord {
            name: "Jane Doe".to_string(),
            prn: prn.to_string(),
            email: "jane@x.com".to_string(),
            elective1: "Pricing".to_string(),
            elective2: "Entrepreneurship".to_string(),
        }
    }

    #[tokio::test]
    async fn test_missing_file_reads_empty() {
        let dir = TempDir::new().unwrap();
        let store = CsvFileStore::new(dir.path().join("enrollments.csv"));

        assert!(store.read_all_rows().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_first_append_writes_header() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/enrollments.csv");
        let store = CsvFileStore::new(&path);

        store.append_row(&record("234567890")).await.unwrap();
        store.append_row(&record("345678901")).await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "Name,PRN,Email,Elective 1,Elective 2");
        assert_eq!(lines[1], "Jane Doe,234567890,jane@x.com,Pricing,Entrepreneurship");
        assert_eq!(lines.len(), 3);

        let rows = store.read_all_rows().await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].get(COLUMN_PRN), "345678901");
    }

    #[tokio::test]
    async fn test_append_follows_existing_header_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("enrollments.csv");
        std::fs::write(&path, "Timestamp,PRN,Elective 1,Elective 2,Name,Email\n").unwrap();
        let store = CsvFileStore::new(&path);

        store.append_row(&record("234567890")).await.unwrap();

        let rows = store.read_all_rows().await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("Timestamp"), "");
        assert_eq!(rows[0].get(COLUMN_PRN), "234567890");
        assert_eq!(rows[0].get(COLUMN_ELECTIVE_1), "Pricing");
        assert_eq!(rows[0].get(COLUMN_NAME), "Jane Doe");
    }

    #[tokio::test]
    async fn test_append_after_unterminated_last_line() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("enrollments.csv");
        std::fs::write(
            &path,
            "Name,PRN,Email,Elective 1,Elective 2\n\
             John Roe,345678901,john@x.com,Behavioral Finance,Pricing",
        )
        .unwrap();
        let store = CsvFileStore::new(&path);

        store.append_row(&record("234567890")).await.unwrap();

        let rows = store.read_all_rows().await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get(COLUMN_ELECTIVE_2), "Pricing");
        assert_eq!(rows[1].get(COLUMN_PRN), "234567890");
        assert_eq!(rows[1].get(COLUMN_NAME), "Jane Doe");
    }

    #[tokio::test]
    async fn test_append_after_unterminated_header() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("enrollments.csv");
        std::fs::write(&path, "Name,PRN,Email,Elective 1,Elective 2").unwrap();
        let store = CsvFileStore::new(&path);

        store.append_row(&record("234567890")).await.unwrap();

        let rows = store.read_all_rows().await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get(COLUMN_PRN), "234567890");
    }
}
