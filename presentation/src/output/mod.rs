//! Console and JSON rendering of review results

pub mod console;
