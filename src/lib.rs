pub mod cli;
pub mod config;
pub mod roster;
pub mod slack;
pub mod tui;
pub mod web;
