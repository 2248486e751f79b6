pub mod color;
pub mod rules;
