//! Markdown rendering of the paper table and splicing it into the list README.

use crate::domain::model::PaperRow;

pub const TABLE_HEADER: &str = "| 标题 | 作者 | 会议/期刊 | 年份 | 代码仓库 | 论文链接 |\n\
|------|------|-----------|------|----------|----------|";

const DOCUMENT_TITLE: &str = "# SLAM开源论文合集";
const TABLE_SECTION: &str = "## 最新开源论文";

/// Line breaks would end the row and a bare `|` would open a new cell.
fn sanitize_cell(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .replace('|', "\\|")
}

pub fn render_row(row: &PaperRow) -> String {
    let paper = sanitize_cell(&row.paper.paper_url);
    format!(
        "| {} | {} | {} | {} | [{}]({}) | [{}]({}) |",
        sanitize_cell(&row.paper.title),
        sanitize_cell(&row.paper.authors),
        sanitize_cell(&row.paper.venue),
        sanitize_cell(&row.paper.year),
        row.repo_full_name,
        row.repo_url,
        paper,
        paper,
    )
}

/// Newest year first; rows without a usable year go last. Ties keep their order.
pub fn sort_rows(rows: &mut [PaperRow]) {
    rows.sort_by(|a, b| b.paper.year_value().cmp(&a.paper.year_value()));
}

/// A rendered row plus the keys needed to merge and order it.
#[derive(Debug, Clone, PartialEq)]
struct TableLine {
    text: String,
    year: Option<u16>,
    repo: Option<String>,
}

impl TableLine {
    fn from_row(row: &PaperRow) -> Self {
        Self {
            text: render_row(row),
            year: row.paper.year_value(),
            repo: Some(row.repo_full_name.clone()),
        }
    }

    fn parse(line: &str) -> Option<Self> {
        let line = line.trim_end();
        if !line.starts_with('|') {
            return None;
        }

        let cells = split_cells(line);
        let year = cells
            .get(3)
            .filter(|c| c.len() == 4)
            .and_then(|c| c.parse().ok());
        let repo = cells.get(4).and_then(|c| link_text(c));

        Some(Self {
            text: line.to_string(),
            year,
            repo,
        })
    }
}

/// Cells of a `| a | b |` row, honoring `\|` escapes.
fn split_cells(line: &str) -> Vec<String> {
    let inner = line.trim().trim_start_matches('|');
    let mut cells = Vec::new();
    let mut current = String::new();
    let mut escaped = false;

    for ch in inner.chars() {
        if ch == '|' && !escaped {
            cells.push(current.trim().to_string());
            current.clear();
        } else {
            current.push(ch);
        }
        escaped = ch == '\\' && !escaped;
    }
    if !current.trim().is_empty() {
        cells.push(current.trim().to_string());
    }
    cells
}

fn link_text(cell: &str) -> Option<String> {
    let rest = cell.strip_prefix('[')?;
    let end = rest.find("](")?;
    Some(rest[..end].to_string())
}

fn merge_lines(new_rows: &[PaperRow], existing_body: Option<&str>) -> Vec<TableLine> {
    let mut lines: Vec<TableLine> = new_rows.iter().map(TableLine::from_row).collect();

    if let Some(body) = existing_body {
        let kept: Vec<TableLine> = body
            .lines()
            .filter_map(TableLine::parse)
            .filter(|old| {
                old.repo
                    .as_ref()
                    .map_or(true, |repo| !new_rows.iter().any(|r| &r.repo_full_name == repo))
            })
            .collect();
        lines.extend(kept);
    }

    lines.sort_by(|a, b| b.year.cmp(&a.year));
    lines
}

fn join_lines(lines: &[TableLine]) -> String {
    lines
        .iter()
        .map(|l| l.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Writes `rows` into the README's paper table.
///
/// - An empty document becomes a fresh list with title and section heading.
/// - A document without the table gets the section appended at the end.
/// - Otherwise the table body, which runs from the header to the next `## `
///   heading, is replaced. With `keep_existing`, previous rows for other
///   repositories stay in the table and everything is re-sorted by year.
pub fn splice_table(existing: &str, rows: &[PaperRow], keep_existing: bool) -> String {
    if existing.trim().is_empty() {
        let body = join_lines(&merge_lines(rows, None));
        return format!("{DOCUMENT_TITLE}\n\n{TABLE_SECTION}\n{TABLE_HEADER}\n{body}\n");
    }

    let Some(start) = existing.find(TABLE_HEADER) else {
        let body = join_lines(&merge_lines(rows, None));
        return format!(
            "{}\n\n{TABLE_SECTION}\n{TABLE_HEADER}\n{body}\n",
            existing.trim_end()
        );
    };

    let body_start = start + TABLE_HEADER.len();
    let body_end = existing[body_start..]
        .find("\n## ")
        .map_or(existing.len(), |offset| body_start + offset);

    let old_body = keep_existing.then(|| &existing[body_start..body_end]);
    let body = join_lines(&merge_lines(rows, old_body));

    let tail = &existing[body_end..];
    let tail = if tail.is_empty() { "\n" } else { tail };

    format!("{}{TABLE_HEADER}\n{body}{tail}", &existing[..start])
}
