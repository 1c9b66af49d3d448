pub mod mitsubishi;
pub mod output;
pub mod types;
