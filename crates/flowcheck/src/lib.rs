#![deny(clippy::all)]

pub mod commands;
pub mod handlers;
pub mod presenter;

pub use handlers::HandlerResult;
