pub mod logging;
pub mod max_records;
