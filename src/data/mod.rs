//! Data structures and file I/O for feature tables.

mod cell;
mod io;
mod persist;
mod table;

pub use cell::{format_number, Cell};
pub use io::{
    parse_delimited, parse_delimited_text, read_table, write_table, TableSource, TextEncoding,
};
pub use persist::{save_table, ConflictPolicy, OutputConfig, SaveOutcome};
pub use table::{Column, ColumnRole, RowIndex, Table};
