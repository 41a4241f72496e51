//! Markdown report for a ranked library.
//!
//! The chart is a text strip plot: one line per paper, `-` spanning the
//! `[Rank_upper, Rank]` interval, `o` at the midpoint (`*` when the paper is
//! highlighted), and `:` marking the median midpoint.
//!
//! `generate_latex_table` renders the same rows as a LaTeX `tabular`.

use crate::summary::{RankSummary, HIGHLIGHT_THRESHOLD};
use crate::table::{RankRow, RankTable};

/// Default width of the chart's plotting area, in characters.
pub const CHART_WIDTH: usize = 60;

/// Render the Markdown report.
///
/// `summary` is `None` when no paper could be ranked; the summary, papers, and
/// chart sections are then left out, but truncation notes and failures are
/// still listed.
pub fn generate_report(table: &RankTable, summary: Option<&RankSummary>) -> String {
    let highlighted = |i: usize| summary.is_some_and(|s| s.is_highlighted(i));
    let mut md = String::with_capacity(2048);

    md.push_str("# Citation Rank Report\n\n");

    // Metadata
    md.push_str("## Metadata\n\n");
    md.push_str("| Field | Value |\n");
    md.push_str("| --- | --- |\n");
    if let Some(id) = &table.collection_id {
        md.push_str(&format!("| Library | {id} |\n"));
    }
    if !table.run_id.is_empty() {
        md.push_str(&format!("| Run ID | {} |\n", table.run_id));
    }
    if let Some(at) = table.generated_at {
        md.push_str(&format!(
            "| Generated | {} |\n",
            at.format("%Y-%m-%d %H:%M:%S UTC")
        ));
    }
    if let Some(catalog) = &table.catalog {
        md.push_str(&format!("| Catalog | {catalog} |\n"));
    }
    if table.has_synthetic {
        md.push_str("| Data | **SYNTHETIC** |\n");
    }
    md.push_str(&format!("| Papers | {} |\n", table.rows.len()));
    if !table.failures.is_empty() {
        md.push_str(&format!("| Failed | {} |\n", table.failures.len()));
    }
    md.push('\n');

    if let Some(summary) = summary {
        write_summary(&mut md, table, summary);
    }

    if !table.rows.is_empty() {
        write_papers(&mut md, table, &highlighted);
    }

    if let Some(summary) = summary {
        md.push_str("## Rank Chart\n\n");
        md.push_str("```\n");
        md.push_str(&render_rank_chart(&table.rows, summary, CHART_WIDTH));
        md.push_str("```\n\n");
    }

    if !table.truncated.is_empty() {
        md.push_str("## Possible Truncation\n\n");
        md.push_str(
            "These papers had at least one citation range return a full page; \
             their month populations may be undercounted.\n\n",
        );
        for note in &table.truncated {
            let ranges: Vec<String> = note.ranges.iter().map(|r| r.to_string()).collect();
            md.push_str(&format!("- {}: {}\n", note.bibcode, ranges.join(", ")));
        }
        md.push('\n');
    }

    if !table.failures.is_empty() {
        md.push_str("## Failures\n\n");
        for f in &table.failures {
            md.push_str(&format!("- {}: {}\n", f.bibcode, f.error));
        }
        md.push('\n');
    }

    md
}

fn write_summary(md: &mut String, table: &RankTable, summary: &RankSummary) {
    let best = table.rows.get(summary.best);
    let worst = table.rows.get(summary.worst);
    md.push_str("## Summary\n\n");
    md.push_str("| Metric | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!(
        "| Median Rank | {:.2}% |\n",
        summary.median_midpoint
    ));
    md.push_str(&format!("| Mean Rank | {:.2}% |\n", summary.mean_midpoint));
    md.push_str(&format!(
        "| Top {HIGHLIGHT_THRESHOLD:.0}% | {} of {} |\n",
        summary.highlighted.len(),
        summary.papers
    ));
    for (label, row) in [("Best", best), ("Worst", worst)] {
        if let Some(row) = row {
            md.push_str(&format!(
                "| {label} | {} ({:.2}%) |\n",
                row.bibcode,
                row.midpoint()
            ));
        }
    }
    md.push('\n');
}

fn write_papers(md: &mut String, table: &RankTable, highlighted: &dyn Fn(usize) -> bool) {
    md.push_str("## Papers\n\n");
    md.push_str("| # | Bibcode | Author | Month | Rank | Rank (upper) | Papers |\n");
    md.push_str("| --- | --- | --- | --- | --- | --- | --- |\n");
    for (i, row) in table.rows.iter().enumerate() {
        let (open, close) = if highlighted(i) { (" **", "** ") } else { (" ", " ") };
        md.push_str(&format!(
            "| {} |{open}{}{close}| {} | {} | {:.2}% | {:.2}% | {} |\n",
            i + 1,
            row.bibcode,
            row.author,
            row.publication_date,
            row.rank,
            row.rank_upper,
            row.paper_number
        ));
    }
    md.push('\n');
}

fn column(percent: f64, width: usize) -> usize {
    let span = width.saturating_sub(1) as f64;
    (percent.clamp(0.0, 100.0) / 100.0 * span).round() as usize
}

/// Render the strip chart. Each line is `<bibcode> |<plot>|`.
pub fn render_rank_chart(rows: &[RankRow], summary: &RankSummary, width: usize) -> String {
    let width = width.max(2);
    let label_width = rows.iter().map(|r| r.bibcode.len()).max().unwrap_or(0);
    let median_col = column(summary.median_midpoint, width);
    let mut out = String::new();

    for (i, row) in rows.iter().enumerate() {
        let mut cells = vec![' '; width];
        cells[median_col] = ':';
        let lo = column(row.rank_upper.min(row.rank), width);
        let hi = column(row.rank_upper.max(row.rank), width);
        for cell in &mut cells[lo..=hi] {
            *cell = '-';
        }
        cells[column(row.midpoint(), width)] = if summary.is_highlighted(i) { '*' } else { 'o' };

        let plot: String = cells.into_iter().collect();
        out.push_str(&format!("{:<label_width$} |{plot}|\n", row.bibcode));
    }

    let axis_label = "0";
    let end_label = "100";
    let gap = width.saturating_sub(axis_label.len() + end_label.len());
    out.push_str(&format!(
        "{:<label_width$}  {axis_label}{}{end_label}  (lower is better)\n",
        "",
        " ".repeat(gap)
    ));
    out
}

/// Escape the first `&` in a bibcode for LaTeX (`A&A` becomes `A\&A`).
pub fn escape_bibcode_latex(bibcode: &str) -> String {
    bibcode.replacen('&', "\\&", 1)
}

/// Render the rows as a LaTeX `tabular`, bolding highlighted papers.
pub fn generate_latex_table(rows: &[RankRow], summary: Option<&RankSummary>) -> String {
    let mut tex = String::new();
    tex.push_str("\\begin{tabular}{lllrrr}\n\\hline\n");
    tex.push_str("Bibcode & Author & Month & Rank & Rank$_{\\rm upper}$ & Papers \\\\\n\\hline\n");
    for (i, row) in rows.iter().enumerate() {
        let code = escape_bibcode_latex(&row.bibcode);
        let code = if summary.is_some_and(|s| s.is_highlighted(i)) {
            format!("\\textbf{{{code}}}")
        } else {
            code
        };
        tex.push_str(&format!(
            "{code} & {} & {} & {:.2} & {:.2} & {} \\\\\n",
            row.author, row.publication_date, row.rank, row.rank_upper, row.paper_number
        ));
    }
    tex.push_str("\\hline\n\\end{tabular}\n");
    tex
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summary::summarize;
    use crate::table::{FailureNote, TruncationNote};
    use citerank_core::SubRange;

    fn row(code: &str, rank: f64, rank_upper: f64) -> RankRow {
        RankRow {
            bibcode: code.into(),
            author: "Doe,J".into(),
            publication_date: "2021-03".into(),
            rank,
            rank_upper,
            paper_number: 1500,
        }
    }

    #[test]
    fn report_has_sections() {
        let mut table = RankTable::from_rows(vec![
            row("2021ApJ...900..1D", 3.0, 2.0),
            row("2021MNRAS.500..2D", 50.0, 40.0),
        ]);
        table.collection_id = Some("abc123".into());
        table.truncated.push(TruncationNote {
            bibcode: "2021ApJ...900..1D".into(),
            ranges: vec![SubRange::new(0, 0)],
        });
        table.failures.push(FailureNote {
            bibcode: "2021XYZ".into(),
            error: "transport failure".into(),
        });
        let summary = summarize(&table.rows).unwrap();
        let md = generate_report(&table, Some(&summary));

        assert!(md.contains("# Citation Rank Report"));
        assert!(md.contains("| Library | abc123 |"));
        assert!(md.contains("| Top 5% | 1 of 2 |"));
        assert!(md.contains("| Best | 2021ApJ...900..1D (2.50%) |"));
        assert!(md.contains("## Rank Chart"));
        assert!(md.contains("- 2021ApJ...900..1D: 0 to 0"));
        assert!(md.contains("## Failures"));
        assert!(md.contains("- 2021XYZ: transport failure"));
    }

    #[test]
    fn chart_marks_interval_midpoint_and_median() {
        let rows = vec![row("a", 100.0, 0.0), row("b", 2.0, 2.0)];
        let summary = summarize(&rows).unwrap();
        let chart = render_rank_chart(&rows, &summary, 11);
        let lines: Vec<&str> = chart.lines().collect();

        // "a" spans the whole axis with its midpoint at 50.
        assert_eq!(lines[0], "a |-----o-----|");
        // "b" is highlighted; median (26.0) lands on column 3.
        assert_eq!(lines[1], "b |*  :       |");
        assert!(lines[2].contains("(lower is better)"));
    }

    #[test]
    fn latex_escape_only_first_ampersand() {
        assert_eq!(escape_bibcode_latex("2016A&A...588A..40B"), "2016A\\&A...588A..40B");
        assert_eq!(escape_bibcode_latex("A&A&B"), "A\\&A&B");
        assert_eq!(escape_bibcode_latex("2020ApJ"), "2020ApJ");
    }

    #[test]
    fn latex_table_bolds_highlighted_rows() {
        let rows = vec![row("2016A&A...588A..40B", 3.0, 2.0), row("2021MNRAS.500..2D", 50.0, 40.0)];
        let summary = summarize(&rows).unwrap();
        let tex = generate_latex_table(&rows, Some(&summary));

        assert!(tex.starts_with("\\begin{tabular}"));
        assert!(tex.contains("\\textbf{2016A\\&A...588A..40B} & Doe,J & 2021-03 & 3.00 & 2.00 & 1500 \\\\"));
        assert!(tex.contains("\n2021MNRAS.500..2D & Doe,J"));
        assert!(tex.trim_end().ends_with("\\end{tabular}"));
    }

    #[test]
    fn report_without_rows_still_lists_failures() {
        let mut table = RankTable::from_rows(Vec::new());
        table.collection_id = Some("abc123".into());
        table.failures.push(FailureNote {
            bibcode: "2021XYZ".into(),
            error: "no such paper".into(),
        });
        let md = generate_report(&table, None);

        assert!(md.contains("| Papers | 0 |"));
        assert!(md.contains("| Failed | 1 |"));
        assert!(md.contains("- 2021XYZ: no such paper"));
        assert!(!md.contains("## Summary"));
        assert!(!md.contains("## Rank Chart"));
        assert!(!md.contains("## Papers"));
    }
}
