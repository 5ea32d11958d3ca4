/// Greedy word wrap.
///
/// Words are appended to the current line while the measured width stays
/// within `max_width`. A word that is too wide on its own gets a line to
/// itself and is never split. Whitespace, newlines included, only separates
/// words; blank input yields no lines.
pub fn wrap_text<F>(text: &str, max_width: u32, measure: F) -> Vec<String>
where
    F: Fn(&str) -> u32,
{
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
            continue;
        }
        let candidate = format!("{current} {word}");
        if measure(&candidate) <= max_width {
            current = candidate;
        } else {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Keep at most `max_lines`; the rest is dropped without an ellipsis.
pub fn truncate_lines(mut lines: Vec<String>, max_lines: usize) -> Vec<String> {
    lines.truncate(max_lines);
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> u32 {
        s.chars().count() as u32
    }

    #[test]
    fn exact_width_fits_on_one_line() {
        let lines = wrap_text("abcd efgh", 9, chars);
        assert_eq!(lines, vec!["abcd efgh"]);
    }

    #[test]
    fn one_char_over_wraps_to_two_lines() {
        let lines = wrap_text("abcd efghi", 9, chars);
        assert_eq!(lines, vec!["abcd", "efghi"]);
    }

    #[test]
    fn long_word_is_never_split() {
        let lines = wrap_text("a supercalifragilistic b", 6, chars);
        assert_eq!(lines, vec!["a", "supercalifragilistic", "b"]);
    }

    #[test]
    fn single_oversized_word_is_one_line() {
        assert_eq!(wrap_text("Pneumoultramicroscópico", 5, chars).len(), 1);
    }

    #[test]
    fn empty_and_blank_text_yield_no_lines() {
        assert!(wrap_text("", 10, chars).is_empty());
        assert!(wrap_text("   \n  ", 10, chars).is_empty());
    }

    #[test]
    fn newlines_are_treated_as_spaces() {
        assert_eq!(wrap_text("um\ndois", 20, chars), vec!["um dois"]);
    }

    #[test]
    fn truncation_drops_excess_lines() {
        let lines = wrap_text("aa bb cc dd", 2, chars);
        assert_eq!(lines.len(), 4);
        assert_eq!(truncate_lines(lines, 2), vec!["aa", "bb"]);
        assert_eq!(truncate_lines(vec!["x".to_string()], 2).len(), 1);
    }
}
