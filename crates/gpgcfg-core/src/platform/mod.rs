pub mod paths;
pub mod shell;
