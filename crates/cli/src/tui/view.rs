use std::fmt::Write as _;

use replaygrid_engine::{LoadStatus, RecordId, Widget};

use crate::util;

/// Display-ready snapshot of a widget: strings only, widths computed.
pub struct TableView {
    /// Header labels, sort arrow included
    pub headers: Vec<String>,
    /// Visible rows as display strings, padded to `headers.len()`
    pub rows: Vec<Vec<String>>,
    pub row_ids: Vec<RecordId>,
    pub widths: Vec<usize>,
    pub loading: bool,
}

impl TableView {
    pub fn from_widget(widget: &Widget) -> Self {
        let mut headers = widget.header_labels();
        let data_cols = widget.rows().iter().map(|r| r.cells.len()).max().unwrap_or(0);
        for c in headers.len()..data_cols {
            headers.push(util::col_to_letter(c));
        }

        let rows: Vec<Vec<String>> = widget
            .rows()
            .iter()
            .map(|row| {
                (0..headers.len())
                    .map(|c| row.cell(c).map(|v| v.to_string()).unwrap_or_default())
                    .collect()
            })
            .collect();
        let row_ids = widget.rows().iter().map(|r| r.id).collect();
        let widths = util::column_widths(&headers, &rows);
        let loading = rows.is_empty() && *widget.load_status() == LoadStatus::Loading;

        Self { headers, rows, row_ids, widths, loading }
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn num_cols(&self) -> usize {
        self.headers.len()
    }

    pub fn width(&self, col: usize) -> usize {
        self.widths.get(col).copied().unwrap_or(util::MIN_COL_WIDTH)
    }

    /// Columns that fit in `available` display columns starting at `start_col`.
    /// Always includes `start_col` itself.
    pub fn visible_columns(&self, start_col: usize, available: usize) -> Vec<usize> {
        let mut cols = Vec::new();
        let mut used = 0usize;
        for c in start_col..self.num_cols() {
            let w = self.width(c) + 1;
            if used + w > available && !cols.is_empty() {
                break;
            }
            used += w;
            cols.push(c);
        }
        cols
    }

    /// Plain text table: header, dashed separator, one line per row.
    /// A loading widget shows a single "Loading data..." row.
    pub fn render_plain(&self) -> String {
        let mut out = String::new();
        let line = |cells: &mut dyn Iterator<Item = String>| -> String {
            cells.collect::<Vec<_>>().join(" ").trim_end().to_string()
        };

        let header = line(&mut (0..self.num_cols()).map(|c| util::pad_right(&self.headers[c], self.width(c))));
        let _ = writeln!(out, "{}", header);
        let sep = line(&mut (0..self.num_cols()).map(|c| "-".repeat(self.width(c))));
        let _ = writeln!(out, "{}", sep);

        if self.loading {
            let _ = writeln!(out, "Loading data...");
        }
        for row in &self.rows {
            let text = line(&mut row.iter().enumerate().map(|(c, v)| util::pad_right(v, self.width(c))));
            let _ = writeln!(out, "{}", text);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn widget() -> Widget {
        Widget::new(
            vec!["Book".into(), "Year".into()],
            vec![
                vec!["The Hobbit".into(), 1937i64.into()],
                vec!["Dune".into(), 1965i64.into(), "extra".into()],
            ],
        )
    }

    #[test]
    fn extra_data_columns_get_letter_titles() {
        let view = TableView::from_widget(&widget());
        assert_eq!(view.headers, vec!["Book", "Year", "C"]);
        assert_eq!(view.rows[0], vec!["The Hobbit", "1937", ""]);
    }

    #[test]
    fn sort_arrow_shows_in_header() {
        let mut w = widget();
        w.sort(1).unwrap();
        let view = TableView::from_widget(&w);
        assert_eq!(view.headers[1], "Year \u{2193}");
        w.sort(1).unwrap();
        let view = TableView::from_widget(&w);
        assert_eq!(view.headers[1], "Year \u{2191}");
        assert_eq!(view.rows[0][0], "Dune");
    }

    #[test]
    fn plain_rendering() {
        let view = TableView::from_widget(&widget());
        let text = view.render_plain();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Book       Year C");
        assert_eq!(lines[1], "---------- ---- -----");
        assert_eq!(lines[2], "The Hobbit 1937");
        assert_eq!(lines[3], "Dune       1965 extra");
    }

    #[test]
    fn loading_row_before_data() {
        let w = Widget::new(vec!["Book".into()], Vec::new());
        let view = TableView::from_widget(&w);
        assert!(view.loading);
        assert!(view.render_plain().contains("Loading data..."));
    }

    #[test]
    fn visible_columns_keep_first() {
        let view = TableView::from_widget(&widget());
        assert_eq!(view.visible_columns(0, 5), vec![0]);
        assert_eq!(view.visible_columns(0, 100), vec![0, 1, 2]);
    }
}
