pub mod admin;
pub mod config;
pub mod health;
pub mod presentations;
pub mod session;
pub mod theme;
pub mod votes;
