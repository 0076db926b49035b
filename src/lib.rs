pub mod browser;
pub mod cli;
pub mod config;
pub mod error;
pub mod inventory;
pub mod lifecycle;
pub mod monitor;
pub mod pages;
pub mod report;
pub mod retry;
pub mod scenarios;
pub mod trace;
