// Library for tests to access modules

pub mod assembler;
pub mod config;
pub mod models;
pub mod probes;
pub mod publisher;
pub mod scheduler;
pub mod version;
