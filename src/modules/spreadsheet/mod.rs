//! Tabular decoding of uploaded spreadsheets
//!
//! Workbooks (xlsx, xlsm, xlsb, xls, ods) go through `calamine`; CSV text goes
//! through `csv`. Either way only the first sheet is read and the first row
//! supplies the keys for every following row.

mod decoder;

pub use decoder::{decode, DecodeError, DecodedSheet, Row, SheetFormat};
