// handlers/mod.rs - Two-tier handler layout
//
// Public (no auth) → Protected (bearer JWT required)
pub mod public;    // /ping, /health, /login
pub mod protected; // /items, /items/:id
