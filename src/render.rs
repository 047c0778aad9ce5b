//! HTML fragments for the commit tables and contributor views.

use base64::Engine;
use std::fmt::Write;

use crate::chart::{BarChart, Chart};
use crate::models::{AuthorCount, CommitRecord, STORE_HEADER};
use crate::store::TableSource;

pub const TABLE_STYLE: &str = r#"<style>
    table {
        border-collapse: collapse;
        width: 100%;
        background-color: #ffffff;
        border: 2px solid #dddddd;
    }
    thead {
        background-color: #f2f2f2;
        text-align: center;
    }
    th, td {
        border: 2px solid #dddddd;
        padding: 10px;
        text-align: center;
    }
    th {
        background-color: #4caf50;
        color: white;
    }
    tr:nth-child(even) {
        background-color: #f2f2f2;
    }
    tr:nth-child(odd) {
        background-color: #ffffff;
    }
    hr {
        margin: 1em 0;
        opacity: 0.6;
    }
</style>"#;

const TOP_LIST_STYLE: &str = r#"<style>
    .top-contributors {
        list-style-type: none;
        padding: 0;
        margin: 0;
        border: 1px solid #ccc;
        border-radius: 5px;
        box-shadow: 0 2px 4px rgba(0, 0, 0, 0.1);
    }
    .top-contributors-title {
        background-color: #f2f2f2;
        padding: 10px;
        border-bottom: 1px solid #ccc;
        border-radius: 5px 5px 0 0;
        font-family: Arial, sans-serif;
    }
    .top-contributors-title h2 {
        margin: 0;
        font-size: 18px;
        color: #333;
    }
    .top-contributors li {
        padding: 10px;
        border-bottom: 1px solid #ccc;
        font-family: Arial, sans-serif;
    }
    .top-contributors li:last-child {
        border-bottom: none;
    }
    .top-contributors li span {
        font-weight: bold;
        margin-right: 10px;
    }
</style>"#;

pub const FILE_NOT_FOUND: &str = "File not found";
pub const FILE_EMPTY: &str = "The file is empty";
pub const NO_AUTHORS: &str = "<h1>No authors found</h1>";

/// Escapes text for HTML element content and attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Renders a store as a sequence of `chunk_size`-row tables.
///
/// Missing, empty, and unreadable stores become a plain message. Only the
/// first table is wrapped in the page shell; the rest are appended after it.
pub fn render_table_page(source: &TableSource, chunk_size: usize) -> String {
    let records = match source {
        TableSource::Records(records) => records,
        TableSource::Missing => return FILE_NOT_FOUND.to_string(),
        TableSource::Empty => return FILE_EMPTY.to_string(),
        TableSource::Unreadable(e) => {
            return format!("An error occurred while reading the file: {}", escape_html(e))
        }
    };

    if records.is_empty() {
        return wrap_page(&render_chunk(&[], 0));
    }

    let mut out = String::new();
    for (i, chunk) in records.chunks(chunk_size.max(1)).enumerate() {
        let table = render_chunk(chunk, i * chunk_size);
        if i == 0 {
            out.push_str(&wrap_page(&table));
        } else {
            out.push_str(&table);
        }
    }
    out
}

fn wrap_page(first_table: &str) -> String {
    format!(
        "<html><head>{}</head><body>{}</body></html>",
        TABLE_STYLE, first_table
    )
}

/// One table; the index column starts at `offset`.
fn render_chunk(rows: &[CommitRecord], offset: usize) -> String {
    let mut html = String::from("<table><thead><tr><th></th>");
    for column in STORE_HEADER {
        let _ = write!(html, "<th>{}</th>", column);
    }
    html.push_str("</tr></thead><tbody>");

    for (i, row) in rows.iter().enumerate() {
        let _ = write!(
            html,
            "<tr><th>{}</th><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            offset + i,
            escape_html(&row.author),
            row.date_string(),
            escape_html(&row.hash),
            escape_html(&row.message),
        );
    }
    html.push_str("</tbody></table>");
    html
}

/// Page embedding the contributor chart, or the no-data heading.
pub fn render_chart_page(chart: &Chart) -> String {
    match chart {
        Chart::NoData => NO_AUTHORS.to_string(),
        Chart::Bars(bars) => render_bars_page(bars),
    }
}

fn render_bars_page(chart: &BarChart) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(&chart.png);
    let mut legend = String::from("<ol class=\"legend\">");
    for entry in &chart.bars {
        let _ = write!(
            legend,
            "<li>{}: {}</li>",
            escape_html(&entry.author),
            entry.count
        );
    }
    legend.push_str("</ol>");

    format!(
        "<html><h1 style=\"text-align:center;\">Major contributors developer</h1><body>\
         <center><img src=\"data:image/png;base64,{}\" width=\"800\" alt=\"Authors by occurrences\"></center>\
         {}</body></html>",
        encoded, legend
    )
}

/// Ranked list of the first `n` contributors.
pub fn render_top_list(frequencies: &[AuthorCount], n: usize) -> String {
    let top = crate::contributors::top_n(frequencies, n);
    let mut html = format!(
        "{}<div class=\"top-contributors\"><div class=\"top-contributors-title\"><h2>Top {} Contributors</h2></div><ol>",
        TOP_LIST_STYLE, n
    );
    for entry in top {
        let _ = write!(
            html,
            "<li><span>{}:</span> {}</li>",
            escape_html(&entry.author),
            entry.count
        );
    }
    html.push_str("</ol></div>");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn record(i: usize) -> CommitRecord {
        CommitRecord {
            author: format!("dev{}", i),
            date: NaiveDateTime::parse_from_str("2024-05-06 07:08:09", "%Y-%m-%d %H:%M:%S")
                .unwrap(),
            hash: format!("{:040x}", i),
            message: format!("Fix security bug #{}", i),
        }
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<script>alert("x") & 'y'</script>"#),
            "&lt;script&gt;alert(&quot;x&quot;) &amp; &#39;y&#39;&lt;/script&gt;"
        );
    }

    #[test]
    fn test_messages_for_unusable_sources() {
        assert_eq!(render_table_page(&TableSource::Missing, 30), "File not found");
        assert_eq!(render_table_page(&TableSource::Empty, 30), FILE_EMPTY);
        let html = render_table_page(&TableSource::Unreadable("bad <row>".into()), 30);
        assert!(html.starts_with("An error occurred while reading the file: "));
        assert!(html.contains("bad &lt;row&gt;"));
    }

    #[test]
    fn test_chunks_and_shell() {
        let records: Vec<CommitRecord> = (0..65).map(record).collect();
        let html = render_table_page(&TableSource::Records(records), 30);
        assert_eq!(html.matches("<table>").count(), 3);
        assert_eq!(html.matches("<html>").count(), 1);
        assert!(html.starts_with("<html><head><style>"));
        // The page shell closes after the first table only.
        let shell_end = html.find("</html>").unwrap();
        assert_eq!(html[..shell_end].matches("<table>").count(), 1);
        // Row numbering continues across chunks.
        assert!(html.contains("<tr><th>30</th><td>dev30</td>"));
        assert!(html.contains("<tr><th>64</th><td>dev64</td>"));
        assert!(html.contains("2024-05-06 07:08:09"));
    }

    #[test]
    fn test_header_only_store_renders_empty_table() {
        let html = render_table_page(&TableSource::Records(Vec::new()), 80);
        assert!(html.contains("<th>author</th><th>date</th><th>hash</th><th>message</th>"));
        assert!(!html.contains("<td>"));
    }

    #[test]
    fn test_cells_are_escaped() {
        let mut r = record(1);
        r.message = "Fix <b>security</b> & more".to_string();
        let html = render_table_page(&TableSource::Records(vec![r]), 30);
        assert!(html.contains("Fix &lt;b&gt;security&lt;/b&gt; &amp; more"));
    }

    #[test]
    fn test_top_list_bounded() {
        let freqs: Vec<AuthorCount> = (0..12)
            .map(|i| AuthorCount::new(format!("dev{}", i), 20 - i))
            .collect();
        let html = render_top_list(&freqs, 10);
        assert_eq!(html.matches("<li>").count(), 10);
        assert!(html.contains("<li><span>dev0:</span> 20</li>"));
        assert!(!html.contains("dev10"));
        assert!(html.contains("Top 10 Contributors"));

        let empty = render_top_list(&[], 10);
        assert_eq!(empty.matches("<li>").count(), 0);
    }

    #[test]
    fn test_no_data_chart_page() {
        assert_eq!(render_chart_page(&Chart::NoData), "<h1>No authors found</h1>");
    }
}
