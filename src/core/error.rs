use thiserror::Error;

use crate::core::types::AgentId;

#[derive(Error, Debug)]
pub enum ArenaError {
    #[error("Agent not found: {0}")]
    AgentNotFound(AgentId),

    #[error("Empty route assigned to {archetype} {agent}")]
    EmptyRoute {
        agent: AgentId,
        archetype: &'static str,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Profile parse error: {0}")]
    ProfileError(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, ArenaError>;
