//! Colored terminal output helpers.
//!
//! Status messages go to stderr so stdout carries only blobs or plaintext
//! and stays safe to pipe.

use comfy_table::{ContentArrangement, Table};
use console::style;

use crate::codec::BlobInfo;
use crate::snapshot::FinancialSnapshot;

/// Print a green success message: "check_mark {msg}"
pub fn success(msg: &str) {
    eprintln!("{} {}", style("\u{2713}").green().bold(), msg);
}

/// Print a red error message: "x_mark {msg}"
pub fn error(msg: &str) {
    eprintln!("{} {}", style("\u{2717}").red().bold(), msg);
}

/// Print a yellow warning: "warning_sign {msg}"
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("\u{26a0}").yellow().bold(), msg);
}

/// Print a dim tip/hint: "arrow {msg}"
pub fn tip(msg: &str) {
    eprintln!("{} {}", style("\u{2192}").dim(), style(msg).dim());
}

/// Print a blob's structure as a table.
pub fn print_blob_info(info: &BlobInfo) {
    println!(
        "Format: {} ({}), {} chars",
        style(info.format).cyan().bold(),
        info.format.prefix(),
        info.total_len
    );

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Field", "Length", "Unit", "OK"]);

    for field in &info.fields {
        table.add_row(vec![
            field.name.to_string(),
            field.len.to_string(),
            field.unit.to_string(),
            if field.valid { "yes" } else { "no" }.to_string(),
        ]);
    }

    println!("{table}");
}

/// Render a financial snapshot and its net worth as a table.
pub fn snapshot_table(snapshot: &FinancialSnapshot) -> String {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Category", "Amount"]);

    for (label, amount) in snapshot.rows() {
        table.add_row(vec![label.to_string(), format!("{amount:.2}")]);
    }
    table.add_row(vec![
        "Net worth".to_string(),
        format!("{:.2}", snapshot.net_worth()),
    ]);

    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_table_lists_rows_and_net_worth() {
        let snapshot = FinancialSnapshot {
            assets: 2500.0,
            liabilities: 300.0,
            loans: 200.0,
            investments: 1000.0,
            expenses: 150.0,
        };
        let table = snapshot_table(&snapshot);
        assert!(table.contains("Liabilities"));
        assert!(table.contains("150.00"));
        assert!(table.contains("Net worth"));
        assert!(table.contains("3000.00"));
    }
}
