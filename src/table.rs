//! Plain-text table rendering for terminal output.

use std::fmt::Write as _;

/// Cells wider than this are cut and end with `…`.
pub const MAX_CELL_WIDTH: usize = 40;

const GUTTER: &str = "  ";

pub fn render_table<S: AsRef<str>>(headers: &[S], rows: &[Vec<String>]) -> String {
    let header_cells: Vec<String> = headers.iter().map(|h| fit(h.as_ref())).collect();
    let body: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            row.iter()
                .take(header_cells.len())
                .map(|cell| fit(cell))
                .collect()
        })
        .collect();

    let mut widths: Vec<usize> = header_cells.iter().map(|h| width(h).max(3)).collect();
    for row in &body {
        for (idx, cell) in row.iter().enumerate() {
            widths[idx] = widths[idx].max(width(cell));
        }
    }

    let mut output = String::new();
    let _ = writeln!(output, "{}", join_padded(&header_cells, &widths));
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    let _ = writeln!(output, "{}", join_padded(&rule, &widths));
    for row in &body {
        let _ = writeln!(output, "{}", join_padded(row, &widths));
    }
    output
}

pub fn print_table<S: AsRef<str>>(headers: &[S], rows: &[Vec<String>]) {
    print!("{}", render_table(headers, rows));
}

fn join_padded(cells: &[String], widths: &[usize]) -> String {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, w)| format!("{cell}{}", " ".repeat(w.saturating_sub(width(cell)))))
        .collect::<Vec<_>>()
        .join(GUTTER);
    line.trim_end().to_string()
}

fn width(value: &str) -> usize {
    value.chars().count()
}

/// Flattens control characters to spaces and truncates to [`MAX_CELL_WIDTH`].
fn fit(value: &str) -> String {
    let flat: String = value
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();
    if width(&flat) <= MAX_CELL_WIDTH {
        flat
    } else {
        let mut cut: String = flat.chars().take(MAX_CELL_WIDTH - 1).collect();
        cut.push('…');
        cut
    }
}
