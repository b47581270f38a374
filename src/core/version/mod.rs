pub mod ordering;

#[allow(unused_imports)]
pub use ordering::{compare_versions, VersionTuple};
