pub mod options;
pub mod repl;
