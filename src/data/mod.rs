pub mod example;
pub mod load_data;

pub use example::{Example, Metadata};
pub use load_data::{group_by_subject, load_examples, read_examples};
