pub mod config;
pub mod fallback;
pub mod filter;
pub mod platform;
pub mod protocol;
pub mod render;
pub mod source;
pub mod widget;
