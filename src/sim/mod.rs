pub mod coordinator;
pub mod engine;
pub mod event;
pub mod session;
pub mod store;
