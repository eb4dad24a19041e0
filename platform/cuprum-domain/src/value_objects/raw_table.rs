/// Text cells of one HTML table, header row kept apart from the body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Position of `name` among the headers, ignoring case and surrounding whitespace.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        let wanted = name.trim();
        self.headers
            .iter()
            .position(|header| header.trim().eq_ignore_ascii_case(wanted))
    }
}

#[cfg(test)]
mod tests {
    use super::RawTable;

    #[test]
    fn column_index_ignores_case_and_padding() {
        let table = RawTable::new(
            vec![" date ".to_string(), "LME Copper stock".to_string()],
            vec![vec!["1. January 2020".to_string(), "100".to_string()]],
        );
        assert_eq!(table.column_index("Date"), Some(0));
        assert_eq!(table.column_index("lme copper stock"), Some(1));
        assert_eq!(table.column_index("LME Copper 3-month"), None);
    }
}
