pub mod diagram;
pub mod table;

pub use diagram::draw_insertion;
pub use table::{write_sequence_table, SequenceRow, SplitReadTable, TableEntry};
