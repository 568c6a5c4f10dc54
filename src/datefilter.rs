use anyhow::{Context, Result};
use regex::Regex;
use tracing::{info, warn};

/// Only a date stamp at the head of a line marks tool-injected provenance
/// metadata; a date mentioned later in the line is note content.
const DATE_WINDOW_CHARS: usize = 20;

pub struct DateLineFilter {
    date_stamp: Regex,
}

impl DateLineFilter {
    pub fn new() -> Result<Self> {
        let date_stamp = Regex::new(
            r"\b\d{1,2}\s+(January|February|March|April|May|June|July|August|September|October|November|December)\s+\d{4}\b",
        )
        .context("failed to compile date-stamp regex")?;

        Ok(Self { date_stamp })
    }

    /// Splits the notes blob on line breaks and drops every line whose first
    /// 20 characters contain a `D Month YYYY` stamp. Kept lines preserve
    /// their original order.
    pub fn filter_lines(&self, notes: &str) -> Vec<String> {
        let mut kept = Vec::new();
        let mut skipped = 0usize;

        for line in notes.lines() {
            let window: String = line.chars().take(DATE_WINDOW_CHARS).collect();
            if self.date_stamp.is_match(&window) {
                warn!(line = %line, "skipping date-stamp line");
                skipped += 1;
                continue;
            }

            kept.push(line.to_string());
        }

        info!(skipped, kept = kept.len(), "date-stamp filter applied");
        kept
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_lines_with_leading_date_stamp() {
        let filter = DateLineFilter::new().unwrap();
        let lines = filter.filter_lines("3 July 1999 some thought\nkept line");
        assert_eq!(lines, vec!["kept line".to_string()]);
    }

    #[test]
    fn keeps_dates_beyond_the_lookahead_window() {
        let filter = DateLineFilter::new().unwrap();
        let lines = filter.filter_lines("some thought on 3 July 1999");
        assert_eq!(lines, vec!["some thought on 3 July 1999".to_string()]);
    }

    #[test]
    fn matches_stamps_that_end_exactly_at_the_window() {
        let filter = DateLineFilter::new().unwrap();
        let lines = filter.filter_lines("12 September 2021 tail text");
        assert!(lines.is_empty());
    }

    #[test]
    fn keeps_ordinary_lines_in_order() {
        let filter = DateLineFilter::new().unwrap();
        let input = "first\n5 January 2020\nsecond\n\nthird";
        let lines = filter.filter_lines(input);
        assert_eq!(
            lines,
            vec![
                "first".to_string(),
                "second".to_string(),
                String::new(),
                "third".to_string(),
            ]
        );
    }

    #[test]
    fn partial_month_names_are_not_stamps() {
        let filter = DateLineFilter::new().unwrap();
        let lines = filter.filter_lines("3 Jul 1999 abbreviation stays");
        assert_eq!(lines.len(), 1);
    }
}
