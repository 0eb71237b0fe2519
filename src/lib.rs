//! Iron Arena - NPC tank decision engine for top-down arena combat

pub mod agent;
pub mod avoidance;
pub mod controller;
pub mod core;
pub mod perception;
pub mod personality;
pub mod route;
pub mod sim;
