pub mod excel_write;
pub mod samples;
pub mod snapshot;
pub mod source;
