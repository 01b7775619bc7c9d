use std::path::PathBuf;

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use nfe_cli::types::{ConvertResult, DocumentSummary};
use nfe_schema::LayoutSummary;

pub fn print_summary(result: &ConvertResult) {
    println!("Input: {}", result.input.display());
    println!("Layout: {}", result.layout);
    match &result.output_dir {
        Some(dir) => println!("Output: {}", dir.display()),
        None => println!("Output: (dry run)"),
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Document"),
        header_cell("Line"),
        header_cell("Records"),
        header_cell("Entities"),
        header_cell("XML"),
        header_cell("JSON"),
        header_cell("Status"),
    ]);
    apply_summary_table_style(&mut table);
    for index in 1..=3 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    align_column(&mut table, 4, CellAlignment::Center);
    align_column(&mut table, 5, CellAlignment::Center);
    for document in &result.documents {
        table.add_row(vec![
            Cell::new(document.index)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            document
                .first_line
                .map_or_else(|| dim_cell("-"), Cell::new),
            Cell::new(document.records),
            Cell::new(document.entities),
            output_cell(document.outputs.xml.as_ref()),
            output_cell(document.outputs.json.as_ref()),
            status_cell(document),
        ]);
    }
    let failed = result.failed();
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        dim_cell("-"),
        Cell::new(result.total_records()).add_attribute(Attribute::Bold),
        Cell::new(result.total_entities()).add_attribute(Attribute::Bold),
        dim_cell("-"),
        dim_cell("-"),
        count_cell(failed, "failed"),
    ]);
    println!("{table}");
    if failed > 0 {
        eprintln!("Errors:");
        for document in &result.documents {
            if let Some(error) = &document.error {
                eprintln!("- document {}: {error}", document.index);
            }
        }
    }
}

pub fn print_layouts(summaries: &[LayoutSummary]) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Layout"),
        header_cell("Records"),
        header_cell("Markers"),
        header_cell("Fields"),
        header_cell("SHA-256"),
    ]);
    apply_table_style(&mut table);
    for index in 1..=3 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    for summary in summaries {
        let sha = summary
            .sha256
            .as_deref()
            .map_or_else(|| dim_cell("-"), |sha| dim_cell(short_hash(sha)));
        table.add_row(vec![
            Cell::new(summary.version)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(summary.counts.records),
            Cell::new(summary.counts.markers),
            Cell::new(summary.counts.fields),
            sha,
        ]);
    }
    println!("{table}");
}

fn short_hash(sha: &str) -> &str {
    sha.get(..12).unwrap_or(sha)
}

fn status_cell(document: &DocumentSummary) -> Cell {
    match &document.error {
        Some(_) => Cell::new("FAILED")
            .fg(Color::Red)
            .add_attribute(Attribute::Bold),
        None => Cell::new("ok").fg(Color::Green),
    }
}

fn output_cell(path: Option<&PathBuf>) -> Cell {
    match path {
        Some(_) => Cell::new("✓")
            .fg(Color::Green)
            .add_attribute(Attribute::Bold),
        None => dim_cell("-"),
    }
}

fn count_cell(count: usize, label: &str) -> Cell {
    if count > 0 {
        Cell::new(format!("{count} {label}"))
            .fg(Color::Red)
            .add_attribute(Attribute::Bold)
    } else {
        dim_cell(format!("0 {label}"))
    }
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(100);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
