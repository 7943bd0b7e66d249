use serde::Serialize;

use crate::dimension::ExperienceDimension;
use crate::preference::ProfileVector;

/// One ranked college in a match response
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MatchResult {
    pub institution_id: u32,
    pub institution_name: String,
    /// Overall alignment in `[0, 1]`
    pub similarity_score: f32,
    pub explanation: String,
    pub strengths: Vec<ExperienceDimension>,
    pub tradeoffs: Vec<ExperienceDimension>,
    /// The college's own dimension scores, for charting
    pub scores: ProfileVector,
}
