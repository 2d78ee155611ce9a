// intake-wizard-types: Layer 1 — shared types, schema, and errors

pub mod config;
pub mod document;
pub mod error;
pub mod event;
pub mod schema;
pub mod steps;
pub mod submit;
pub mod validation;

pub use config::*;
pub use document::*;
pub use error::*;
pub use event::*;
pub use schema::*;
pub use steps::*;
pub use submit::*;
pub use validation::*;
