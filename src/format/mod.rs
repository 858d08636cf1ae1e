//! Label-file format support.

mod error;
mod labels;

pub use error::FormatError;
pub use labels::{
    parse, read_label_file, serialize, shapes_from_records, write_label_file, LabelRecord,
};
