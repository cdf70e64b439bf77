use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const COLUMN_NAME: &str = "Name";
pub const COLUMN_PRN: &str = "PRN";
pub const COLUMN_EMAIL: &str = "Email";
pub const COLUMN_ELECTIVE_1: &str = "Elective 1";
pub const COLUMN_ELECTIVE_2: &str = "Elective 2";

/// 寫入順序即為表格欄位順序
pub const COLUMNS: [&str; 5] = [
    COLUMN_NAME,
    COLUMN_PRN,
    COLUMN_EMAIL,
    COLUMN_ELECTIVE_1,
    COLUMN_ELECTIVE_2,
];

/// One raw row from the tabular store, keyed by column header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    pub cells: HashMap<String, String>,
}

impl Row {
    pub fn new(cells: HashMap<String, String>) -> Self {
        Self { cells }
    }

    /// Missing columns read as empty.
    pub fn get(&self, column: &str) -> &str {
        self.cells.get(column).map(String::as_str).unwrap_or("")
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Row {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            cells: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrollmentRecord {
    pub name: String,
    pub prn: String,
    pub email: String,
    pub elective1: String,
    pub elective2: String,
}

impl EnrollmentRecord {
    pub fn from_row(row: &Row) -> Self {
        Self {
            name: row.get(COLUMN_NAME).to_string(),
            prn: row.get(COLUMN_PRN).to_string(),
            email: row.get(COLUMN_EMAIL).to_string(),
            elective1: row.get(COLUMN_ELECTIVE_1).to_string(),
            elective2: row.get(COLUMN_ELECTIVE_2).to_string(),
        }
    }

    /// 依 COLUMNS 順序輸出
    pub fn to_values(&self) -> [&str; 5] {
        [
            &self.name,
            &self.prn,
            &self.email,
            &self.elective1,
            &self.elective2,
        ]
    }

    /// Value for a store column; unknown columns are empty.
    pub fn value(&self, column: &str) -> &str {
        match column {
            COLUMN_NAME => &self.name,
            COLUMN_PRN => &self.prn,
            COLUMN_EMAIL => &self.email,
            COLUMN_ELECTIVE_1 => &self.elective1,
            COLUMN_ELECTIVE_2 => &self.elective2,
            _ => "",
        }
    }

    pub fn electives(&self) -> [&str; 2] {
        [&self.elective1, &self.elective2]
    }
}

/// A submission as typed into the form, before any validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub name: String,
    pub prn: String,
    pub email: String,
    /// Elective names in the order they were selected.
    pub electives: Vec<String>,
}

impl Candidate {
    pub fn new(
        name: impl Into<String>,
        prn: impl Into<String>,
        email: impl Into<String>,
        electives: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            prn: prn.into(),
            email: email.into(),
            electives,
        }
    }
}
