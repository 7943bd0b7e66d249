use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::ValidationError;
use crate::preference::{ProfileVector, ScoreScale};

/// Published cost components, in dollars per academic year
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CostProfile {
    pub tuition_in_state: Option<f64>,
    pub tuition_out_of_state: Option<f64>,
    pub room_board_on_campus: Option<f64>,
    pub room_board_off_campus: Option<f64>,
    pub books_supplies: Option<f64>,
    pub other_expenses: Option<f64>,
}

/// Admission, completion and earnings statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Outcomes {
    /// Fraction of applicants admitted
    pub admission_rate: Option<f64>,
    /// Average SAT equivalent score of admitted students
    pub sat_average: Option<f64>,
    /// Fraction of students completing within 150% of normal time
    pub completion_rate: Option<f64>,
    /// Fraction of first-time full-time students returning for year two
    pub retention_rate: Option<f64>,
    pub median_earnings_10yr: Option<f64>,
}

/// A college as held in the catalog
#[derive(Debug, Clone, Serialize)]
pub struct College {
    pub id: u32,
    pub name: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub control: Option<u8>,
    pub undergrad_enrollment: Option<u32>,
    pub costs: CostProfile,
    pub outcomes: Outcomes,
    /// Alumni experience scores; `None` when the survey data is incomplete
    pub profile: Option<ProfileVector>,
}

impl College {
    pub fn is_candidate(&self) -> bool {
        self.profile.is_some()
    }

    /// "City, ST" when both are known
    pub fn location(&self) -> Option<String> {
        match (&self.city, &self.state) {
            (Some(city), Some(state)) => Some(format!("{city}, {state}")),
            (Some(city), None) => Some(city.clone()),
            (None, Some(state)) => Some(state.clone()),
            (None, None) => None,
        }
    }
}

/// One row of the catalog file.
///
/// Field aliases accept College Scorecard column names so a merged export can
/// be loaded directly.
#[derive(Debug, Clone, Deserialize)]
pub struct CollegeRecord {
    #[serde(alias = "UNITID")]
    pub id: u32,
    #[serde(alias = "INSTNM")]
    pub name: String,
    #[serde(default, alias = "CITY")]
    pub city: Option<String>,
    #[serde(default, alias = "STABBR")]
    pub state: Option<String>,
    #[serde(default, alias = "CONTROL")]
    pub control: Option<u8>,
    #[serde(default, alias = "UGDS")]
    pub undergrad_enrollment: Option<u32>,
    #[serde(default, alias = "TUITIONFEE_IN")]
    pub tuition_in_state: Option<f64>,
    #[serde(default, alias = "TUITIONFEE_OUT")]
    pub tuition_out_of_state: Option<f64>,
    #[serde(default, alias = "ROOMBOARD_ON")]
    pub room_board_on_campus: Option<f64>,
    #[serde(default, alias = "ROOMBOARD_OFF")]
    pub room_board_off_campus: Option<f64>,
    #[serde(default, alias = "BOOKSUPPLY")]
    pub books_supplies: Option<f64>,
    #[serde(default, alias = "OTHEREXPENSE_ON")]
    pub other_expenses: Option<f64>,
    #[serde(default, alias = "ADM_RATE")]
    pub admission_rate: Option<f64>,
    #[serde(default, alias = "SAT_AVG")]
    pub sat_average: Option<f64>,
    #[serde(default, alias = "C150_4")]
    pub completion_rate: Option<f64>,
    #[serde(default, alias = "RET_FT4")]
    pub retention_rate: Option<f64>,
    #[serde(default, alias = "MD_EARN_WNE_P10")]
    pub median_earnings_10yr: Option<f64>,
    /// Dimension key -> aggregated alumni score
    #[serde(default)]
    pub experience: Option<BTreeMap<String, f64>>,
}

impl CollegeRecord {
    /// Convert into a [`College`].
    ///
    /// An invalid experience map is returned alongside the college (which then
    /// has no profile) so the caller can decide how loudly to report it.
    pub fn into_college(self, scale: ScoreScale) -> (College, Option<ValidationError>) {
        let (profile, problem) = match &self.experience {
            Some(raw) => match ProfileVector::from_map(raw, scale) {
                Ok(p) => (Some(p), None),
                Err(e) => (None, Some(e)),
            },
            None => (None, None),
        };

        let college = College {
            id: self.id,
            name: self.name,
            city: self.city,
            state: self.state,
            control: self.control,
            undergrad_enrollment: self.undergrad_enrollment,
            costs: CostProfile {
                tuition_in_state: self.tuition_in_state,
                tuition_out_of_state: self.tuition_out_of_state,
                room_board_on_campus: self.room_board_on_campus,
                room_board_off_campus: self.room_board_off_campus,
                books_supplies: self.books_supplies,
                other_expenses: self.other_expenses,
            },
            outcomes: Outcomes {
                admission_rate: self.admission_rate,
                sat_average: self.sat_average,
                completion_rate: self.completion_rate,
                retention_rate: self.retention_rate,
                median_earnings_10yr: self.median_earnings_10yr,
            },
            profile,
        };

        (college, problem)
    }
}
