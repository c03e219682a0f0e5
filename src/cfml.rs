//! Main module for cfml library functionality

pub mod ast;
pub mod building;
pub mod config;
pub mod grammar;
pub mod parsing;
pub mod testing;
