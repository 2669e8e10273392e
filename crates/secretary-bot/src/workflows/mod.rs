pub mod secretary;
