pub mod common;
pub mod entries;
pub mod meta;
pub mod show;
