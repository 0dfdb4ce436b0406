//! Console adapter: command-line front end over a demo command set.

pub mod args;
pub mod commands;
pub mod demo;
pub mod render;
