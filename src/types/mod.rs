pub mod metric;
pub mod reading;
pub mod season;
pub mod source;
