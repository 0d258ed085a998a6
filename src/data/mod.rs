//! Tabular input.

mod loader;

pub use loader::{load_csv, load_reader, CHANGE_COLUMN, PRICE_COLUMN};
