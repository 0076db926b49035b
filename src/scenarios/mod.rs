pub mod catalog;
pub mod flows;
