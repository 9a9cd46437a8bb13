pub mod config;
pub mod found_item;
pub mod lost_item;
