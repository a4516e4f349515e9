// src/roundtable/mod.rs

pub mod agent;
pub mod client_wrapper;
pub mod clients;
pub mod completion;
pub mod config;
pub mod console;
pub mod event;
pub mod history;
pub mod http_client_pool;
pub mod orchestration;
pub mod prompt;

// Let's explicitly export Orchestration so we don't have to access it via
// roundtable::orchestration::Orchestration and instead as roundtable::Orchestration
pub use orchestration::Orchestration;
