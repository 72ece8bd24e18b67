//! Moodify: text in, primary emotion and a matching recommendation out.
//!
//! The emotion heuristic lives in [`emotion`]; [`language`] talks to Azure AI
//! Language, [`recommend`] holds the recommendation catalogue and [`api`]
//! wires everything behind axum handlers.

pub mod analysis;
pub mod api;
pub mod config;
pub mod emotion;
pub mod error;
pub mod keywords;
pub mod language;
pub mod recommend;
