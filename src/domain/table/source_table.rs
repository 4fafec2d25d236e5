// ============================================================
// SOURCE TABLE
// ============================================================
// Raw rows as read from the input file, never mutated

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceTable {
    /// Header row, in file order
    pub headers: Vec<String>,

    /// Records in file order; each has exactly `headers.len()` cells
    pub records: Vec<Vec<String>>,
}

impl SourceTable {
    pub fn new(headers: Vec<String>, records: Vec<Vec<String>>) -> Self {
        Self { headers, records }
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
