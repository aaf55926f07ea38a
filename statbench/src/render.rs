//! Markdown renderer
//!
//! Flattens a `ResultTable` into a pipe table: nested column labels are joined
//! as "Group / Leaf" and nested row headers as "Group / Row".

use statbench_core::ResultTable;

/// Render one table
pub fn render(table: &ResultTable) -> String {
    let mut output = format!("### {}\n\n", table.title);

    let columns = table.leaf_columns();
    let mut header = String::from("| |");
    let mut separator = String::from("|---|");
    for (path, _) in &columns {
        header.push_str(&format!(" {} |", escape(&path.join(" / "))));
        separator.push_str("---|");
    }
    output.push_str(&header);
    output.push('\n');
    output.push_str(&separator);
    output.push('\n');

    for (path, row) in table.leaf_rows() {
        output.push_str(&format!("| {} |", escape(&path.join(" / "))));
        for (_, key) in &columns {
            let cell = row.get(key).map(|v| escape(&v.to_string())).unwrap_or_default();
            output.push_str(&format!(" {} |", cell));
        }
        output.push('\n');
    }

    if !table.footnotes.is_empty() {
        output.push('\n');
        for note in &table.footnotes {
            output.push_str(&format!("_{}_\n", note));
        }
    }
    output
}

/// Render tables separated by blank lines
pub fn render_all(tables: &[ResultTable]) -> String {
    tables.iter().map(render).collect::<Vec<_>>().join("\n")
}

fn escape(text: &str) -> String {
    text.replace('|', "\\|")
}
