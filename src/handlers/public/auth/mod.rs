// handlers/public/auth/mod.rs - Token acquisition

pub mod login; // POST /login - exchange credentials for a JWT

pub use login::login_post;
