pub mod baseline;
pub mod compare;

pub use baseline::{baseline, BaselineArgs};
pub use compare::{compare, CompareArgs, OutputFormat};
