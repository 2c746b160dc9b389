pub mod convert;
pub mod exposure;
pub mod simulate;
