//! Ordering strategies for PDF URLs

use serde::Deserialize;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::url::path_basename;
use crate::SchemaError;

/// Names accepted by [`SortBy::from_str`]
pub const SORT_BY_OPTIONS: &[&str] = &["none", "numeric", "alpha", "alpha_desc"];

/// Caller-supplied comparator; takes precedence over any [`SortBy`]
pub type SortKey = Arc<dyn Fn(&str, &str) -> Ordering + Send + Sync>;

/// Built-in ordering strategies
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    /// Keep discovery order
    #[default]
    None,
    /// Order by the numbers in the filename (`ch2` before `ch10`)
    Numeric,
    /// Filename, case-insensitive, ascending
    Alpha,
    /// Filename, case-insensitive, descending
    AlphaDesc,
}

impl SortBy {
    /// Parses a strategy name, falling back to [`SortBy::None`] with a warning
    pub fn parse_lenient(value: &str) -> Self {
        value.parse().unwrap_or_else(|_| {
            tracing::warn!("Unknown sort_by value: {}. Using no sorting.", value);
            SortBy::None
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortBy::None => "none",
            SortBy::Numeric => "numeric",
            SortBy::Alpha => "alpha",
            SortBy::AlphaDesc => "alpha_desc",
        }
    }
}

impl FromStr for SortBy {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(SortBy::None),
            "numeric" => Ok(SortBy::Numeric),
            "alpha" => Ok(SortBy::Alpha),
            "alpha_desc" => Ok(SortBy::AlphaDesc),
            other => Err(SchemaError::InvalidSortBy(other.to_string())),
        }
    }
}

impl fmt::Display for SortBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Numbers found in the URL's filename, in order; `None` when there are none
///
/// Runs too long for a `u64` saturate.
pub fn numeric_key(url: &str) -> Option<Vec<u64>> {
    let name = path_basename(url);
    let numbers: Vec<u64> = name
        .split(|c: char| !c.is_ascii_digit())
        .filter(|run| !run.is_empty())
        .map(|run| run.parse().unwrap_or(u64::MAX))
        .collect();
    (!numbers.is_empty()).then_some(numbers)
}

fn alpha_key(url: &str) -> String {
    path_basename(url).to_lowercase()
}

fn compare_numeric(a: &str, b: &str) -> Ordering {
    match (numeric_key(a), numeric_key(b)) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Sorts URLs in place
///
/// A custom comparator wins over `sort_by`. The sort is stable, so ties keep
/// discovery order in every strategy, descending included.
pub fn sort_urls(urls: &mut [String], sort_by: SortBy, sort_key: Option<&SortKey>) {
    if let Some(compare) = sort_key {
        urls.sort_by(|a, b| compare(a, b));
        tracing::debug!("Sorted {} PDFs using custom key", urls.len());
        return;
    }

    match sort_by {
        SortBy::None => return,
        SortBy::Numeric => urls.sort_by(|a, b| compare_numeric(a, b)),
        SortBy::Alpha => urls.sort_by_key(|u| alpha_key(u)),
        SortBy::AlphaDesc => urls.sort_by(|a, b| alpha_key(b).cmp(&alpha_key(a))),
    }
    tracing::debug!("Sorted {} PDFs using {}", urls.len(), sort_by);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn urls(names: &[&str]) -> Vec<String> {
        names
            .iter()
            .map(|n| format!("https://example.com/docs/{}", n))
            .collect()
    }

    fn names(urls: &[String]) -> Vec<String> {
        urls.iter().map(|u| path_basename(u)).collect()
    }

    #[test]
    fn test_parse_known_values() {
        for option in SORT_BY_OPTIONS {
            let parsed: SortBy = option.parse().unwrap();
            assert_eq!(parsed.as_str(), *option);
        }
        assert!("random".parse::<SortBy>().is_err());
        assert_eq!(SortBy::parse_lenient("random"), SortBy::None);
    }

    #[test]
    fn test_numeric_sort() {
        let mut list = urls(&["chapter_10.pdf", "chapter_2.pdf", "chapter_1.pdf"]);
        sort_urls(&mut list, SortBy::Numeric, None);
        assert_eq!(names(&list), vec!["chapter_1.pdf", "chapter_2.pdf", "chapter_10.pdf"]);
    }

    #[test]
    fn test_numeric_sort_multiple_runs_and_no_digits_last() {
        let mut list = urls(&["appendix.pdf", "v2_part10.pdf", "v2_part3.pdf", "v1_part20.pdf"]);
        sort_urls(&mut list, SortBy::Numeric, None);
        assert_eq!(
            names(&list),
            vec!["v1_part20.pdf", "v2_part3.pdf", "v2_part10.pdf", "appendix.pdf"]
        );
    }

    #[test]
    fn test_numeric_key_ignores_directories() {
        assert_eq!(numeric_key("https://example.com/2023/report.pdf"), None);
        assert_eq!(numeric_key("https://example.com/a/ch07.pdf"), Some(vec![7]));
    }

    #[test]
    fn test_alpha_sorts() {
        let mut list = urls(&["beta.pdf", "Alpha.pdf", "gamma.pdf"]);
        sort_urls(&mut list, SortBy::Alpha, None);
        assert_eq!(names(&list), vec!["Alpha.pdf", "beta.pdf", "gamma.pdf"]);

        sort_urls(&mut list, SortBy::AlphaDesc, None);
        assert_eq!(names(&list), vec!["gamma.pdf", "beta.pdf", "Alpha.pdf"]);
    }

    #[test]
    fn test_none_keeps_order() {
        let mut list = urls(&["c.pdf", "a.pdf", "b.pdf"]);
        sort_urls(&mut list, SortBy::None, None);
        assert_eq!(names(&list), vec!["c.pdf", "a.pdf", "b.pdf"]);
    }

    #[test]
    fn test_custom_key_wins() {
        let by_length: SortKey = Arc::new(|a: &str, b: &str| a.len().cmp(&b.len()));
        let mut list = urls(&["ccc.pdf", "a.pdf", "bb.pdf"]);
        sort_urls(&mut list, SortBy::AlphaDesc, Some(&by_length));
        assert_eq!(names(&list), vec!["a.pdf", "bb.pdf", "ccc.pdf"]);
    }

    #[test]
    fn test_stable_for_ties() {
        let mut list = vec![
            "https://a.com/x/doc.pdf".to_string(),
            "https://b.com/y/DOC.pdf".to_string(),
        ];
        sort_urls(&mut list, SortBy::AlphaDesc, None);
        assert!(list[0].starts_with("https://a.com"));
    }
}
