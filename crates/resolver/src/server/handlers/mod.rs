//! Endpoint handlers

pub mod form;
pub mod resolve;
pub mod status;
