pub mod animation;
pub mod assets;
pub mod audio;
pub mod boss;
pub mod collision;
pub mod compute;
pub mod config;
pub mod entities;
pub mod error;
pub mod geometry;
pub mod input;
pub mod player;
pub mod spawn;
pub mod world;
