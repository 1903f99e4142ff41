//! Switch-line drivers and one-shot hardware initialisation.

pub mod hw_init;
pub mod switch_bank;
pub mod switch_line;
