pub mod exclusion;
pub mod similarity;
pub mod text;
pub mod vocabulary;
