pub mod env;
pub mod suite;
pub mod unit;
