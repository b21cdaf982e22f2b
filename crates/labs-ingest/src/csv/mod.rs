//! CSV reading utilities.

mod columns;
mod reader;

pub use columns::{any_to_string, column_values, missing_columns, require_columns};
pub use reader::{
    MAX_CSV_FILE_SIZE, QUEST_HEADER_SKIP_ROWS, check_file_size, check_file_size_with_limit,
    read_csv_table,
};
