use chrono::{DateTime, Utc};

use crate::export::{Cell, ExportTable};

/// Page geometry for [`to_document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentLayout {
    /// Table rows per page; the header row is repeated on every page.
    pub rows_per_page: usize,
    /// Blank characters between columns.
    pub column_gap: usize,
}

impl Default for DocumentLayout {
    fn default() -> Self {
        Self {
            rows_per_page: 40,
            column_gap: 2,
        }
    }
}

/// Format a number with `,` thousands separators and at most three
/// fractional digits, trailing zeros dropped.
pub(crate) fn group_thousands(n: f64) -> String {
    if !n.is_finite() {
        return n.to_string();
    }
    let fixed = format!("{:.3}", n.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let frac = frac_part.trim_end_matches('0');

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3 + 5);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if !frac.is_empty() {
        grouped.push('.');
        grouped.push_str(frac);
    }
    let is_zero = int_part.chars().all(|c| c == '0') && frac.is_empty();
    if n < 0.0 && !is_zero {
        grouped.insert(0, '-');
    }
    grouped
}

fn display(cell: Option<&Cell>) -> String {
    match cell {
        Some(Cell::Number(n)) => group_thousands(*n),
        Some(Cell::Text(s)) => s.clone(),
        None => String::new(),
    }
}

fn pad(text: &str, width: usize, right_align: bool) -> String {
    let len = text.chars().count();
    if len >= width {
        return text.to_string();
    }
    let fill = " ".repeat(width - len);
    if right_align {
        format!("{fill}{text}")
    } else {
        format!("{text}{fill}")
    }
}

/// Render `table` as a paginated plain-text document.
///
/// The first page opens with the title (when set) and a "Generated on" line.
/// Every page repeats the column header and ends with a `Page i of n`
/// footer; pages are separated by a form feed. An empty table still produces
/// one page.
pub fn to_document(
    table: &ExportTable,
    generated_at: DateTime<Utc>,
    layout: &DocumentLayout,
) -> String {
    let body: Vec<Vec<(String, bool)>> = table
        .rows
        .iter()
        .map(|row| {
            table
                .ordered_cells(row)
                .into_iter()
                .map(|cell| (display(cell), matches!(cell, Some(Cell::Number(_)))))
                .collect()
        })
        .collect();

    let widths: Vec<usize> = table
        .headers
        .iter()
        .enumerate()
        .map(|(i, h)| {
            let content = body
                .iter()
                .map(|r| r[i].0.chars().count())
                .max()
                .unwrap_or(0);
            content
                .max(h.label.chars().count())
                .max(h.width.unwrap_or(0))
        })
        .collect();
    let gap = " ".repeat(layout.column_gap);
    let line_width =
        widths.iter().sum::<usize>() + layout.column_gap * widths.len().saturating_sub(1);

    let header_line = table
        .headers
        .iter()
        .zip(&widths)
        .map(|(h, &w)| pad(h.label, w, false))
        .collect::<Vec<_>>()
        .join(&gap);
    let rule = "-".repeat(line_width);

    let per_page = layout.rows_per_page.max(1);
    let pages: Vec<&[Vec<(String, bool)>]> = if body.is_empty() {
        vec![&body[..]]
    } else {
        body.chunks(per_page).collect()
    };
    let page_count = pages.len();

    let mut out = String::new();
    for (index, page) in pages.iter().enumerate() {
        if index == 0 {
            if let Some(title) = &table.title {
                out.push_str(title);
                out.push('\n');
            }
            out.push_str(&format!(
                "Generated on: {}\n\n",
                generated_at.format("%m/%d/%Y, %H:%M:%S UTC")
            ));
        } else {
            out.push('\u{000C}');
        }
        out.push_str(header_line.trim_end());
        out.push('\n');
        out.push_str(&rule);
        out.push('\n');
        for row in page.iter() {
            let line = row
                .iter()
                .zip(&widths)
                .map(|((text, numeric), &w)| pad(text, w, *numeric))
                .collect::<Vec<_>>()
                .join(&gap);
            out.push_str(line.trim_end());
            out.push('\n');
        }
        let footer = format!("Page {} of {}", index + 1, page_count);
        out.push('\n');
        out.push_str(&pad(&footer, line_width, true));
        out.push('\n');
    }
    out
}
