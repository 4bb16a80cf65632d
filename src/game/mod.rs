pub mod commands;
pub mod engine;
pub mod messages;
pub mod registry;

pub use engine::GameSession;
