//! TalentFlow mock hiring API: a jobs board, candidate tracker and assessment
//! builder served from a local document store, with simulated network latency
//! and write failures.

pub mod assessments;
pub mod candidates;
pub mod client;
pub mod config;
pub mod db;
pub mod errors;
pub mod jobs;
pub mod models;
pub mod routes;
pub mod seed;
pub mod simulation;
pub mod state;
pub mod store;

#[cfg(test)]
mod testing;
