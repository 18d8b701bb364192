pub mod bank;
pub mod entity;
pub mod error;
pub mod feed;
