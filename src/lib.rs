pub mod auth;
pub mod chiave;
pub mod cli;
