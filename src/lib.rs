pub mod board;
pub mod collisions;
pub mod constants;
pub mod layout;
pub mod navigation;
pub mod npc;
pub mod rng;
pub mod scoring;
pub mod session;
pub mod types;
pub mod world;
