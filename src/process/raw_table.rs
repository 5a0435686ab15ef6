/// One survey year's results, as strings, the way the CSV holds them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SurveyTable {
    /// Survey year the rows were collected in.
    pub year: u16,
    /// Column names. After `safe_rename` these are canonical names.
    pub headers: Vec<String>,
    /// One entry per respondent, one field per header.
    pub rows: Vec<Vec<String>>,
}

impl SurveyTable {
    pub fn new(year: u16, headers: Vec<String>) -> Self {
        Self {
            year,
            headers,
            rows: Vec::new(),
        }
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// All cells of column `name`; short rows read as empty.
    pub fn column(&self, name: &str) -> Option<Vec<&str>> {
        let idx = self.column_index(name)?;
        Some(
            self.rows
                .iter()
                .map(|row| row.get(idx).map(String::as_str).unwrap_or(""))
                .collect(),
        )
    }

    /// Number of respondents.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_reads_short_rows_as_empty() {
        let mut t = SurveyTable::new(2020, vec!["ResponseId".into(), "Lang".into()]);
        t.rows.push(vec!["1".into(), "Rust".into()]);
        t.rows.push(vec!["2".into()]);

        assert_eq!(t.column("Lang").unwrap(), vec!["Rust", ""]);
        assert!(t.column("Nope").is_none());
        assert_eq!(t.len(), 2);
    }
}
