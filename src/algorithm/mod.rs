pub mod common;
pub mod search;
