pub mod generate;
pub mod types;

pub use generate::{GenerateCommand, GenerateOptions};
pub use types::TypesCommand;
