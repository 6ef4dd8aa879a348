pub mod activation;
pub mod catalog;
pub mod commands;
pub mod loader;
pub mod resolver;
pub mod runtime;
pub mod specification;
pub mod version;
