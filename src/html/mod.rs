mod reader;

pub use reader::{read_units, read_units_from_bytes};
