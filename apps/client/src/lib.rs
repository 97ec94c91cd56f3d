//! Auto Intern client core: session and localization state, the View Gate,
//! and the screens that consume them.

pub mod api_client;
pub mod config;
pub mod errors;
pub mod i18n;
pub mod models;
pub mod session;
pub mod state;
pub mod view;

#[cfg(test)]
mod testing;
