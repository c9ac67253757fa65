pub mod source;

pub use source::{InMemoryResultSource, ResultSource};
