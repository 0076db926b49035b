pub mod automation;
pub mod events;
pub mod session;
