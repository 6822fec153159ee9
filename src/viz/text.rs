//! Text measurement and wrapping for legend layout.

/// Heuristic: estimate pixel width of text (Plotters has no built-in text measuring).
/// Each glyph counts as 0.6 em.
pub fn estimate_text_width_px(text: &str, font_px: u32) -> u32 {
    (text.chars().count() as u32 * font_px * 3).div_ceil(5)
}

/// Largest char count whose estimated width fits `max_px` (at least 1).
fn chars_that_fit(font_px: u32, max_px: u32) -> usize {
    let per_char_x5 = (font_px * 3).max(1);
    ((max_px * 5 / per_char_x5) as usize).max(1)
}

/// Cut `text` to `max_px`, ending with an ellipsis when shortened.
pub fn truncate_to_width(text: &str, font_px: u32, max_px: u32) -> String {
    if estimate_text_width_px(text, font_px) <= max_px {
        return text.to_string();
    }
    let keep = chars_that_fit(font_px, max_px).saturating_sub(1);
    let mut out: String = text.chars().take(keep).collect();
    out.push('…');
    out
}

/// Greedy word wrap to `max_px`; words longer than a line are split by characters.
pub fn wrap_text_to_width(text: &str, font_px: u32, max_px: u32) -> Vec<String> {
    let cap = chars_that_fit(font_px, max_px);
    let mut lines: Vec<String> = Vec::new();
    let mut cur = String::new();
    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > cap {
            if !cur.is_empty() {
                lines.push(std::mem::take(&mut cur));
            }
            lines.push(word.drain(..cap).collect());
        }
        let word: String = word.into_iter().collect();
        let needed = cur.chars().count() + usize::from(!cur.is_empty()) + word.chars().count();
        if needed > cap && !cur.is_empty() {
            lines.push(std::mem::take(&mut cur));
        }
        if !cur.is_empty() {
            cur.push(' ');
        }
        cur.push_str(&word);
    }
    if !cur.is_empty() {
        lines.push(cur);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_one_line() {
        assert_eq!(wrap_text_to_width("Data 1: 10", 14, 400), vec!["Data 1: 10"]);
        assert_eq!(truncate_to_width("abc", 10, 100), "abc");
    }

    #[test]
    fn long_text_wraps_on_words() {
        // 10px font → 6px per char → 5 chars per 30px line
        let lines = wrap_text_to_width("aa bb cc", 10, 30);
        assert_eq!(lines, vec!["aa bb", "cc"]);
    }

    #[test]
    fn overlong_word_is_split() {
        let lines = wrap_text_to_width("abcdefghijkl", 10, 30);
        assert_eq!(lines, vec!["abcde", "fghij", "kl"]);
    }

    #[test]
    fn truncation_adds_ellipsis() {
        let t = truncate_to_width("abcdefghij", 10, 30);
        assert_eq!(t, "abcd…");
        assert!(estimate_text_width_px(&t, 10) <= 30);
    }
}
