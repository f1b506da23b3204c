pub mod cli;
pub mod commands;
pub mod refset;
pub mod utils;
