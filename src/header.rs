use std::collections::HashMap;

use log::warn;

/// Column name to position map built from a header row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderIndex {
    positions: HashMap<String, usize>,
    width: usize,
}

impl HeaderIndex {
    /// Maps each cell of `row` to its zero-based position. When a name
    /// repeats, the later position wins.
    pub fn from_row<I>(row: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut positions = HashMap::new();
        let mut width = 0;
        for (index, name) in row.into_iter().enumerate() {
            let name = name.as_ref();
            if let Some(previous) = positions.insert(name.to_string(), index) {
                warn!(
                    "Header column '{}' appears at positions {} and {}; using {}",
                    name, previous, index, index
                );
            }
            width = index + 1;
        }
        HeaderIndex { positions, width }
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.positions.contains_key(name)
    }

    /// Number of distinct column names.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Number of cells in the header row, duplicates included.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Names with their positions, in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> + '_ {
        let mut entries: Vec<(&str, usize)> = self
            .positions
            .iter()
            .map(|(name, position)| (name.as_str(), *position))
            .collect();
        entries.sort_by_key(|(_, position)| *position);
        entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_names_to_positions() {
        let header = HeaderIndex::from_row(["name", "age", "active"]);
        assert_eq!(header.position("name"), Some(0));
        assert_eq!(header.position("active"), Some(2));
        assert_eq!(header.position("missing"), None);
        assert!(header.contains("age"));
        assert_eq!(header.len(), 3);
        assert_eq!(header.width(), 3);
        assert_eq!(
            header.iter().collect::<Vec<_>>(),
            [("name", 0), ("age", 1), ("active", 2)]
        );
    }

    #[test]
    fn later_duplicate_wins() {
        let header = HeaderIndex::from_row(vec!["id".to_string(), "x".into(), "id".into()]);
        assert_eq!(header.position("id"), Some(2));
        assert_eq!(header.len(), 2);
        assert_eq!(header.width(), 3);
    }

    #[test]
    fn empty_row_gives_empty_index() {
        let header = HeaderIndex::from_row(Vec::<&str>::new());
        assert!(header.is_empty());
        assert_eq!(header, HeaderIndex::default());
    }
}
