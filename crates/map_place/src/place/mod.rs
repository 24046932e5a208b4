//! Placement pipeline: rules, candidate allocation, commands and the runner.
pub mod allocate;
pub mod catalog;
pub mod command;
pub mod events;
pub mod rules;
pub mod runner;
