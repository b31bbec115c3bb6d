pub mod export;
pub mod parsing;
