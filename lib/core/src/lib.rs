//! # EduAlign Core
//!
//! Core library for the EduAlign college matching service.
//!
//! This crate provides the shared data model and the pure computations:
//!
//! - [`ExperienceDimension`] - The 8 fixed experience axes
//! - [`PreferenceVector`] / [`ProfileVector`] - Student weights and college scores
//! - [`Vectorizer`] - Slider completion and rule-based slider suggestions
//! - [`College`] - A catalog entry with costs, outcomes and alumni profile
//! - [`finance`] - Semester cost, graduation plan and budget arithmetic
//! - [`predictions`] - Admission, earnings and graduation estimates
//!
//! ## Example
//!
//! ```rust
//! use edualign_core::{ExperienceDimension, StudentProfile, Vectorizer};
//! use std::collections::BTreeMap;
//!
//! let vectorizer = Vectorizer::default();
//! let profile = StudentProfile {
//!     major: Some("Nursing".to_string()),
//!     gpa: Some(3.8),
//!     ..Default::default()
//! };
//!
//! // Sliders the student moved win, the rest come from the profile
//! let partial = BTreeMap::from([("social_life".to_string(), 9.0)]);
//! let prefs = vectorizer.vectorize(&partial, Some(&profile)).unwrap();
//! assert_eq!(prefs.get(ExperienceDimension::SocialLife), 9.0);
//! assert_eq!(prefs.get(ExperienceDimension::CampusSafety), 8.0);
//! ```

pub mod college;
pub mod dimension;
pub mod error;
pub mod finance;
pub mod predictions;
pub mod preference;
pub mod result;
pub mod student;
pub mod vector;
pub mod vectorizer;

pub use college::{College, CollegeRecord, CostProfile, Outcomes};
pub use dimension::{ExperienceDimension, DIMENSION_COUNT};
pub use error::{Error, Result, ValidationError};
pub use predictions::{AdmissionCategory, CollegePrediction, EarningsDistribution};
pub use preference::{PreferenceVector, ProfileVector, ScoreScale};
pub use result::MatchResult;
pub use student::StudentProfile;
pub use vector::{cosine_similarity, Vector};
pub use vectorizer::{SuggestionPolicy, Vectorizer};
