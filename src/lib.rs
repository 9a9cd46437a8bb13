pub mod db;
pub mod domain;
pub mod models;
pub mod processing;
pub mod repository;
pub mod schema;

/// Cosine-similarity threshold a candidate must strictly exceed to count as a match.
pub const SIMILARITY_THRESHOLD: f32 = 0.6;
