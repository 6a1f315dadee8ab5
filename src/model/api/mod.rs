//! API-compatible types.
//!
//! Request bodies are validated before they touch a sheet, and responses are
//! shaped for the viewing user, e.g. votes are counted and the viewer's own
//! picks are flagged.

pub mod auth;
pub mod question;
pub mod trip;
