//! # EduAlign Matching
//!
//! Ranks colleges against a student's preference vector.
//!
//! The primary path asks a text generation service to rank a cosine
//! pre-filtered shortlist. Any timeout, error or malformed reply falls back to
//! pure cosine similarity with templated explanations, so a request always
//! gets an answer. Prediction narratives follow the same rule with templated
//! text as the fallback.
//!
//! ```rust
//! use edualign_core::{College, PreferenceVector, ProfileVector};
//! use edualign_matching::{Matcher, MatcherConfig};
//! use std::sync::Arc;
//!
//! # tokio_test_block(async {
//! let college = Arc::new(College {
//!     id: 1,
//!     name: "Example University".to_string(),
//!     city: None,
//!     state: None,
//!     control: None,
//!     undergrad_enrollment: None,
//!     costs: Default::default(),
//!     outcomes: Default::default(),
//!     profile: Some(ProfileVector::new([0.6; 8])),
//! });
//!
//! let matcher = Matcher::new(MatcherConfig::default());
//! let outcome = matcher
//!     .match_colleges(&PreferenceVector::default(), None, &[college], 4)
//!     .await;
//! assert!(outcome.used_fallback());
//! assert_eq!(outcome.results().len(), 1);
//! # });
//! # fn tokio_test_block<F: std::future::Future>(f: F) {
//! #     tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(f);
//! # }
//! ```

pub mod explain;
pub mod gemini;
pub mod generation;
pub mod matcher;
pub mod narrative;
pub mod prompt;
pub mod rank;

pub use gemini::{GeminiClient, GeminiConfig};
pub use generation::{GenerationError, Generator, Prompt};
pub use matcher::{MatchOutcome, Matcher, MatcherConfig};
pub use narrative::Narratives;
pub use rank::{rank_candidates, ScoredCollege};
