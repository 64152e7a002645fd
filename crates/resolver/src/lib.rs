//! Resolver - Incident Intelligence Assistant
//!
//! Takes a free-text incident description, finds similar historical incidents
//! with Snowflake Cortex vector similarity and asks a Cortex completion model
//! for a structured remediation recommendation.

pub mod cli;
pub mod collector;
pub mod config;
pub mod error;
pub mod generator;
pub mod incident;
pub mod pipeline;
pub mod retriever;
pub mod server;
pub mod warehouse;

pub use error::{ResolveError, Stage, ValidationError};
pub use incident::{IncidentId, IncidentQuery, MatchRecord, Recommendation};
pub use pipeline::{Resolution, Resolver};
