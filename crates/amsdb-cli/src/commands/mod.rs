pub mod metadata;
pub mod show;
pub mod store;
