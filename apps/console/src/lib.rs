//! Admin-console core for a personal portfolio site: the session guard in
//! front of the developer console, and the sync client that reads, saves and
//! re-ingests portfolio content against the backend.

pub mod config;
pub mod console;
pub mod editor;
pub mod errors;
pub mod models;
pub mod routes;
pub mod session;
pub mod status;
pub mod sync_client;

#[cfg(test)]
mod test_support;
