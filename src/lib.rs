//! # EduAlign
//!
//! Matches prospective students to colleges by the experience they want,
//! using alumni-reported scores on eight fixed dimensions.
//!
//! ## Quick Start
//!
//! ### As a Server
//!
//! ```bash
//! GEMINI_API_KEY=... edualign --catalog data/colleges.json --http-port 8000
//! ```
//!
//! Without an API key every match is served by cosine similarity.
//!
//! ### As a Library
//!
//! ```rust,no_run
//! use edualign::prelude::*;
//! use std::collections::BTreeMap;
//!
//! # async fn run() -> edualign::Result<()> {
//! let catalog = CollegeCatalog::load("data/colleges.json", ScoreScale::Unit)?;
//! let vectorizer = Vectorizer::default();
//! let prefs = vectorizer.vectorize(&BTreeMap::from([("career_support".to_string(), 9.0)]), None)?;
//!
//! let matcher = Matcher::new(MatcherConfig::default());
//! let outcome = matcher.match_colleges(&prefs, None, catalog.candidates(), 4).await;
//! for m in outcome.results() {
//!     println!("{} {:.2}: {}", m.institution_name, m.similarity_score, m.explanation);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Crate Structure
//!
//! - `edualign-core` - Dimensions, preference and profile vectors, slider
//!   suggestions, financial planning, admission/earnings/graduation estimates
//! - `edualign-matching` - Generated ranking with a cosine similarity fallback,
//!   prediction narratives
//! - `edualign-storage` - College catalog and match history
//! - `edualign-api` - REST API

// Re-export core types
pub use edualign_core::{
    finance, predictions, College, CollegePrediction, Error, ExperienceDimension, MatchResult, PreferenceVector, ProfileVector,
    Result, ScoreScale, StudentProfile, SuggestionPolicy, ValidationError, Vectorizer,
};

// Re-export matching
pub use edualign_matching::{
    GeminiClient, GeminiConfig, GenerationError, Generator, MatchOutcome, Matcher, MatcherConfig,
    Narratives,
};

// Re-export storage
pub use edualign_storage::{CollegeCatalog, MatchHistory};

// Re-export API
pub use edualign_api::{AppState, RestApi};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        College, CollegeCatalog, Error, ExperienceDimension, MatchOutcome, MatchResult, Matcher,
        MatcherConfig, PreferenceVector, Result, ScoreScale, StudentProfile, Vectorizer,
    };
}
