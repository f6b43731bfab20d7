//! Output rendering

pub mod console;
