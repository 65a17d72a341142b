pub mod attachment;
pub mod config;
pub mod events;
pub mod profile;
pub mod records;
