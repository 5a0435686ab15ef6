//! Multi-select answers → one indicator column per category.

use std::collections::{BTreeMap, BTreeSet};

use super::utils::{clean_str, is_missing};

/// Multi-hot encoding of one multi-select column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndicatorColumns {
    /// Category names, sorted.
    pub categories: Vec<String>,
    /// `columns[c][row]` is set when respondent `row` picked `categories[c]`.
    pub columns: Vec<Vec<bool>>,
    /// Whether the respondent answered the question at all.
    pub answered: Vec<bool>,
}

impl IndicatorColumns {
    pub fn rows(&self) -> usize {
        self.answered.len()
    }

    pub fn answered_count(&self) -> usize {
        self.answered.iter().filter(|a| **a).count()
    }

    pub fn column(&self, category: &str) -> Option<&[bool]> {
        let idx = self.categories.binary_search_by(|c| c.as_str().cmp(category)).ok()?;
        Some(self.columns[idx].as_slice())
    }

    /// Respondents that picked each category, in `categories` order.
    pub fn selected_counts(&self) -> Vec<usize> {
        self.columns
            .iter()
            .map(|col| col.iter().filter(|v| **v).count())
            .collect()
    }
}

/// Split one cell into its answers. An empty delimiter means the column is
/// single-select and the whole cell is the answer.
pub fn split_answers(cell: &str, delimiter: &str) -> Vec<String> {
    let parts: Vec<&str> = if delimiter.is_empty() {
        vec![cell]
    } else {
        cell.split(delimiter).collect()
    };
    parts
        .into_iter()
        .map(clean_str)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Encode `values` into indicator columns.
///
/// Blank and NA cells are unanswered and get an all-false row. Answers are
/// mapped through `aliases` and counted at most once per respondent, so
/// two spellings of the same category never double count.
pub fn encode_multi_select<S: AsRef<str>>(
    values: &[S],
    delimiter: &str,
    na_values: &[String],
    aliases: &BTreeMap<String, String>,
) -> IndicatorColumns {
    let mut per_row: Vec<BTreeSet<String>> = Vec::with_capacity(values.len());
    let mut answered = Vec::with_capacity(values.len());
    let mut all: BTreeSet<String> = BTreeSet::new();

    for v in values {
        let cell = v.as_ref();
        if is_missing(cell, na_values) {
            per_row.push(BTreeSet::new());
            answered.push(false);
            continue;
        }

        let picks: BTreeSet<String> = split_answers(cell, delimiter)
            .into_iter()
            .filter(|a| !na_values.contains(a))
            .map(|a| aliases.get(&a).cloned().unwrap_or(a))
            .collect();

        answered.push(!picks.is_empty());
        all.extend(picks.iter().cloned());
        per_row.push(picks);
    }

    let categories: Vec<String> = all.into_iter().collect();
    let index: BTreeMap<&str, usize> = categories
        .iter()
        .enumerate()
        .map(|(i, c)| (c.as_str(), i))
        .collect();

    let mut columns = vec![vec![false; per_row.len()]; categories.len()];
    for (row, picks) in per_row.iter().enumerate() {
        for p in picks {
            if let Some(&c) = index.get(p.as_str()) {
                columns[c][row] = true;
            }
        }
    }

    IndicatorColumns {
        categories,
        columns,
        answered,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn na() -> Vec<String> {
        vec!["NA".to_string()]
    }

    #[test]
    fn expands_semicolon_lists() {
        let values = ["Python;Go;Rust", "Go", "NA", ""];
        let ind = encode_multi_select(&values, ";", &na(), &BTreeMap::new());

        assert_eq!(ind.categories, vec!["Go", "Python", "Rust"]);
        assert_eq!(ind.column("Go").unwrap(), &[true, true, false, false]);
        assert_eq!(ind.column("Rust").unwrap(), &[true, false, false, false]);
        assert_eq!(ind.answered, vec![true, true, false, false]);
        assert_eq!(ind.rows(), 4);
        assert_eq!(ind.answered_count(), 2);
    }

    #[test]
    fn honours_spaced_delimiter() {
        let values = ["Java; C#; SQL"];
        let ind = encode_multi_select(&values, "; ", &na(), &BTreeMap::new());
        assert_eq!(ind.categories, vec!["C#", "Java", "SQL"]);
    }

    #[test]
    fn aliases_collapse_without_double_counting() {
        let mut aliases = BTreeMap::new();
        aliases.insert("HTML".to_string(), "HTML/CSS".to_string());
        aliases.insert("CSS".to_string(), "HTML/CSS".to_string());

        let values = ["HTML;CSS;JavaScript", "HTML/CSS"];
        let ind = encode_multi_select(&values, ";", &na(), &aliases);

        assert_eq!(ind.categories, vec!["HTML/CSS", "JavaScript"]);
        assert_eq!(ind.selected_counts(), vec![2, 1]);
    }

    #[test]
    fn empty_delimiter_is_single_select() {
        let values = ["Yes; really", "No"];
        let ind = encode_multi_select(&values, "", &na(), &BTreeMap::new());
        assert_eq!(ind.categories, vec!["No", "Yes; really"]);
    }

    #[test]
    fn cell_of_only_delimiters_is_unanswered() {
        let values = [";;", "Rust"];
        let ind = encode_multi_select(&values, ";", &na(), &BTreeMap::new());
        assert_eq!(ind.answered, vec![false, true]);
    }
}
