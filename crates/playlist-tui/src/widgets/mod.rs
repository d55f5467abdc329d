pub mod filter_input;
pub mod text;
