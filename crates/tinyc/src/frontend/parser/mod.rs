//! Parser for tiny source code

mod parser;

pub use parser::Parser;
