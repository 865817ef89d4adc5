// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Liveness checks and token acquisition.

pub mod auth;
pub mod ping;

pub use auth::*;
pub use ping::{health, ping};
