use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Narrowest and widest a table column is drawn, in display columns.
pub(crate) const MIN_COL_WIDTH: usize = 3;
pub(crate) const MAX_COL_WIDTH: usize = 32;

/// Display width of a string, accounting for CJK double-width, emoji, etc.
pub(crate) fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Cut `s` to at most `width` display columns, ending in `…` when cut.
pub(crate) fn truncate_display(s: &str, width: usize) -> String {
    if display_width(s) <= width {
        return s.to_string();
    }
    if width == 0 {
        return String::new();
    }

    let budget = width - 1;
    let mut used = 0;
    let mut out = String::new();
    for ch in s.chars() {
        let cw = ch.width().unwrap_or(0);
        if used + cw > budget {
            break;
        }
        used += cw;
        out.push(ch);
    }
    out.push('\u{2026}');
    out
}

/// Exactly `width` display columns: truncated, or right-padded with spaces.
pub(crate) fn pad_right(s: &str, width: usize) -> String {
    let cut = truncate_display(s, width);
    let used = display_width(&cut);
    format!("{}{}", cut, " ".repeat(width.saturating_sub(used)))
}

/// Convert column index to letter (0 -> A, 1 -> B, 26 -> AA, etc.)
/// Used as the title of data columns beyond the configured headers.
pub(crate) fn col_to_letter(col: usize) -> String {
    let mut result = String::new();
    let mut n = col;
    loop {
        result.insert(0, (b'A' + (n % 26) as u8) as char);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    result
}

/// Per-column width: the widest of the header and every cell,
/// clamped to [`MIN_COL_WIDTH`, `MAX_COL_WIDTH`].
pub(crate) fn column_widths(headers: &[String], rows: &[Vec<String>]) -> Vec<usize> {
    let cols = rows
        .iter()
        .map(|r| r.len())
        .max()
        .unwrap_or(0)
        .max(headers.len());
    (0..cols)
        .map(|c| {
            let header = headers.get(c).map(|h| display_width(h)).unwrap_or(0);
            let cells = rows
                .iter()
                .filter_map(|r| r.get(c))
                .map(|s| display_width(s))
                .max()
                .unwrap_or(0);
            header.max(cells).clamp(MIN_COL_WIDTH, MAX_COL_WIDTH)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_width_cjk() {
        assert_eq!(display_width("hello"), 5);
        assert_eq!(display_width("\u{4e16}\u{754c}"), 4); // "世界"
    }

    #[test]
    fn truncate_fits() {
        assert_eq!(truncate_display("abc", 3), "abc");
        assert_eq!(truncate_display("", 0), "");
    }

    #[test]
    fn truncate_cuts_with_ellipsis() {
        assert_eq!(truncate_display("abcdef", 4), "abc\u{2026}");
        assert_eq!(truncate_display("abcdef", 1), "\u{2026}");
        assert_eq!(truncate_display("abcdef", 0), "");
    }

    #[test]
    fn truncate_cjk_boundary() {
        // 8 display cols into 4: one wide char (2) fits the budget of 3
        let t = truncate_display("\u{4e16}\u{754c}\u{4f60}\u{597d}", 4);
        assert_eq!(t, "\u{4e16}\u{2026}");
        assert!(display_width(&t) <= 4);
    }

    #[test]
    fn pad_right_pads_and_cuts() {
        assert_eq!(pad_right("ab", 5), "ab   ");
        assert_eq!(pad_right("abcde", 5), "abcde");
        assert_eq!(pad_right("abcdef", 5), "abcd\u{2026}");
    }

    #[test]
    fn col_letters() {
        assert_eq!(col_to_letter(0), "A");
        assert_eq!(col_to_letter(26), "AA");
        assert_eq!(col_to_letter(701), "ZZ");
    }

    #[test]
    fn widths_cover_headers_and_cells() {
        let headers = vec!["Book".to_string(), "Year".to_string()];
        let rows = vec![
            vec!["The Hobbit".to_string(), "1937".to_string(), "x".to_string()],
            vec!["Dune".to_string()],
        ];
        assert_eq!(column_widths(&headers, &rows), vec![10, 4, 3]);
    }
}
