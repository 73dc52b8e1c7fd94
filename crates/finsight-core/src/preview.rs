//! Plain-text table preview of the leading rows, embedded in advisor prompts

use crate::models::Dataset;

/// Render the first `limit` rows as a right-aligned text table
///
/// Every sheet column appears, in sheet order, with no index column. Blank
/// cells render as blanks. An empty dataset (or a zero limit) renders the
/// header line only.
pub fn render_preview(dataset: &Dataset, limit: usize) -> String {
    let headers = &dataset.columns;
    let lines: Vec<&[String]> = dataset
        .rows()
        .iter()
        .take(limit)
        .map(|row| row.cells.as_slice())
        .collect();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for line in &lines {
        for (width, cell) in widths.iter_mut().zip(line.iter()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = Vec::with_capacity(lines.len() + 1);
    out.push(format_line(headers, &widths));
    for line in &lines {
        out.push(format_line(line, &widths));
    }
    out.join("\n")
}

fn format_line(cells: &[String], widths: &[usize]) -> String {
    widths
        .iter()
        .enumerate()
        .map(|(i, width)| {
            let cell = cells.get(i).map(String::as_str).unwrap_or("");
            format!("{:>width$}", cell, width = *width)
        })
        .collect::<Vec<_>>()
        .join(" ")
        .trim_end()
        .to_string()
}
