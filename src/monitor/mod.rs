pub mod classifier;
pub mod network;
