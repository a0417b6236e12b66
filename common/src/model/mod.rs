pub mod draft;
pub mod merge;
