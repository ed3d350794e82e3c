//! Trigger-pattern recognition for creating a block from typed text.
//!
//! Besides explicit insertion, a block is created when a typed line matches
//! the citation trigger, e.g. `/bible john 3:16`.

use std::sync::OnceLock;

use regex::Regex;

fn trigger_regex() -> &'static Regex {
    static TRIGGER_REGEX: OnceLock<Regex> = OnceLock::new();
    TRIGGER_REGEX
        .get_or_init(|| Regex::new(r"(?i)^\s*/bible\s+(\S.*)$").expect("Invalid trigger regex"))
}

/// Extract the lookup query from a typed line, if it is a citation trigger
pub fn match_trigger(line: &str) -> Option<&str> {
    trigger_regex()
        .captures(line)
        .and_then(|captures| captures.get(1))
        .map(|query| query.as_str().trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case::plain("/bible john 3:16", "john 3:16")]
    #[case::uppercase("/BIBLE Genesis 1:1-3", "Genesis 1:1-3")]
    #[case::leading_whitespace("   /bible psalm 23", "psalm 23")]
    #[case::trailing_whitespace("/bible psalm 23   ", "psalm 23")]
    fn test_trigger_lines_yield_query(#[case] line: &str, #[case] query: &str) {
        assert_eq!(match_trigger(line), Some(query));
    }

    #[rstest]
    #[case::prose("reading the bible tonight")]
    #[case::bare_trigger("/bible")]
    #[case::bare_trigger_with_space("/bible   ")]
    #[case::wrong_command("/verse john 3:16")]
    #[case::mid_line("note: /bible john 3:16")]
    fn test_non_trigger_lines_do_not_match(#[case] line: &str) {
        assert_eq!(match_trigger(line), None);
    }
}
