use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use labs_cli::types::{ConvertResult, OutputStatus};

pub fn print_summary(result: &ConvertResult) {
    println!("Input: {}", result.input_file.display());
    let mut table = Table::new();
    table.set_header(vec![header_cell("Metric"), header_cell("Value")]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);

    table.add_row(vec![label_cell("Source rows"), Cell::new(result.source_rows)]);
    table.add_row(vec![label_cell("Patients"), Cell::new(result.patients)]);
    table.add_row(vec![
        label_cell("Rows without patient id"),
        count_cell(result.skipped_rows, Color::Yellow),
    ]);
    table.add_row(vec![
        label_cell("Rows without draw time"),
        count_cell(result.undated_rows, Color::Yellow),
    ]);
    table.add_row(vec![label_cell("Visit rows"), Cell::new(result.visit_rows)]);
    table.add_row(vec![
        label_cell("Rows after ID filter"),
        match result.filtered_rows {
            Some(rows) => Cell::new(rows),
            None => dim_cell("-"),
        },
    ]);
    table.add_row(vec![
        label_cell("Lymphocyte results disambiguated"),
        Cell::new(result.disambiguated),
    ]);
    table.add_row(vec![
        label_cell("Duplicate reports resolved"),
        count_cell(result.conflicts.len(), Color::Yellow),
    ]);
    let unmapped = result.unmapped_names();
    table.add_row(vec![
        label_cell("Unmapped result names"),
        count_cell(unmapped.len(), Color::Yellow),
    ]);
    table.add_row(vec![
        Cell::new("Output").add_attribute(Attribute::Bold),
        output_cell(result),
    ]);
    println!("{table}");

    if !unmapped.is_empty() {
        println!("Unmapped: {}", unmapped.join(", "));
    }
    print_status_line(result);
}

fn print_status_line(result: &ConvertResult) {
    match result.status {
        OutputStatus::Written => println!(
            "Wrote {} rows to {}",
            result.output_rows,
            result.output_file.display()
        ),
        OutputStatus::DryRun => println!(
            "Dry run: {} rows not written to {}",
            result.output_rows,
            result.output_file.display()
        ),
        OutputStatus::Empty => println!("No lab data to upload; no file written"),
    }
}

fn output_cell(result: &ConvertResult) -> Cell {
    match result.status {
        OutputStatus::Written => Cell::new(result.output_file.display())
            .fg(Color::Green)
            .add_attribute(Attribute::Bold),
        OutputStatus::DryRun => dim_cell("dry run"),
        OutputStatus::Empty => Cell::new("not written").fg(Color::Yellow),
    }
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(100);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn label_cell(label: &str) -> Cell {
    Cell::new(label)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
