//! Financial planning arithmetic over catalog cost data.

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::college::College;
use crate::error::{Error, Result, ValidationError};

/// Months a student has to save before the first semester
pub const MONTHS_UNTIL_START: f64 = 6.0;

/// Spending within this factor of the expected spend counts as on track
pub const ON_TRACK_TOLERANCE: f64 = 1.05;

/// Longest degree a graduation plan accepts
pub const MAX_DEGREE_YEARS: u32 = 10;

/// Per-semester cost breakdown for one college
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostEstimate {
    pub institution_id: u32,
    pub institution_name: String,
    pub in_state: bool,
    pub on_campus: bool,
    pub tuition: Option<f64>,
    pub housing: Option<f64>,
    pub books: Option<f64>,
    pub other: Option<f64>,
    pub annual_total: f64,
    pub semester_total: Option<f64>,
}

pub fn estimate_semester_cost(college: &College, in_state: bool, on_campus: bool) -> CostEstimate {
    let costs = &college.costs;
    let tuition = if in_state {
        costs.tuition_in_state
    } else {
        costs.tuition_out_of_state
    };
    let housing = if on_campus {
        costs.room_board_on_campus
    } else {
        costs.room_board_off_campus
    };
    let books = costs.books_supplies;
    let other = costs.other_expenses;

    let annual_total: f64 = [tuition, housing, books, other].iter().flatten().sum();
    let semester_total = (annual_total > 0.0).then(|| annual_total / 2.0);

    CostEstimate {
        institution_id: college.id,
        institution_name: college.name.clone(),
        in_state,
        on_campus,
        tuition,
        housing,
        books,
        other,
        annual_total,
        semester_total,
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlanRequest {
    pub budget_per_semester: f64,
    pub total_savings: f64,
    #[serde(default = "default_true")]
    pub in_state: bool,
    #[serde(default = "default_true")]
    pub on_campus: bool,
    #[serde(default = "default_degree_years")]
    pub degree_years: u32,
}

fn default_true() -> bool {
    true
}

fn default_degree_years() -> u32 {
    4
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraduationPlan {
    #[serde(flatten)]
    pub costs: CostEstimate,
    pub degree_years: u32,
    pub total_semesters: u32,
    pub total_cost: f64,
    pub total_savings: f64,
    pub remaining_to_fund: f64,
    pub can_graduate_on_time: bool,
    pub budget_covers_semester: bool,
    pub affordable_semesters: u32,
    pub semesters_short: u32,
    pub estimated_graduation_years: u32,
    pub monthly_savings_needed: f64,
}

/// Whether a student can fund a degree at `college` on time, and what it takes
pub fn graduation_plan(college: &College, req: &PlanRequest) -> Result<GraduationPlan> {
    check_amount("budget_per_semester", req.budget_per_semester)?;
    check_amount("total_savings", req.total_savings)?;
    if !(1..=MAX_DEGREE_YEARS).contains(&req.degree_years) {
        return Err(ValidationError::invalid_field(
            "degree_years",
            format!("must be between 1 and {MAX_DEGREE_YEARS}"),
        )
        .into());
    }

    let costs = estimate_semester_cost(college, req.in_state, req.on_campus);
    let semester_cost = costs
        .semester_total
        .ok_or(Error::InsufficientCostData(college.id))?;

    let total_semesters = req.degree_years * 2;
    let total_cost = semester_cost * total_semesters as f64;
    let remaining = total_cost - req.total_savings;
    let can_graduate_on_time = req.total_savings >= total_cost;

    let affordable_semesters = ((req.total_savings / semester_cost).floor() as u32).min(total_semesters);
    let semesters_short = total_semesters - affordable_semesters;

    let estimated_graduation_years = if can_graduate_on_time {
        req.degree_years
    } else {
        affordable_semesters.div_ceil(2)
    };

    Ok(GraduationPlan {
        costs,
        degree_years: req.degree_years,
        total_semesters,
        total_cost,
        total_savings: req.total_savings,
        remaining_to_fund: remaining.max(0.0),
        can_graduate_on_time,
        budget_covers_semester: req.budget_per_semester >= semester_cost,
        affordable_semesters,
        semesters_short,
        estimated_graduation_years,
        monthly_savings_needed: if remaining > 0.0 {
            remaining / MONTHS_UNTIL_START
        } else {
            0.0
        },
    })
}

#[derive(Debug, Clone, Deserialize)]
pub struct BudgetTrackerRequest {
    pub total_cost: f64,
    pub semesters_completed: u32,
    pub total_semesters: u32,
    pub amount_spent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetStatus {
    pub total_cost: f64,
    pub amount_spent: f64,
    pub remaining: f64,
    pub semesters_completed: u32,
    pub semesters_left: u32,
    pub per_semester_remaining: f64,
    pub expected_spend_so_far: f64,
    pub on_track: bool,
    pub over_under: f64,
}

/// Spending progress toward graduation
pub fn budget_tracker(req: &BudgetTrackerRequest) -> Result<BudgetStatus> {
    check_amount("total_cost", req.total_cost)?;
    check_amount("amount_spent", req.amount_spent)?;
    if req.total_semesters == 0 {
        return Err(ValidationError::invalid_field("total_semesters", "must be at least 1").into());
    }
    if req.semesters_completed > req.total_semesters {
        return Err(ValidationError::invalid_field(
            "semesters_completed",
            "cannot exceed total_semesters",
        )
        .into());
    }

    let expected = req.semesters_completed as f64 / req.total_semesters as f64 * req.total_cost;
    let remaining = req.total_cost - req.amount_spent;
    let semesters_left = req.total_semesters - req.semesters_completed;

    Ok(BudgetStatus {
        total_cost: req.total_cost,
        amount_spent: req.amount_spent,
        remaining,
        semesters_completed: req.semesters_completed,
        semesters_left,
        per_semester_remaining: if semesters_left > 0 {
            remaining / semesters_left as f64
        } else {
            0.0
        },
        expected_spend_so_far: expected,
        on_track: req.amount_spent <= expected * ON_TRACK_TOLERANCE,
        over_under: req.amount_spent - expected,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alternative {
    pub institution_id: u32,
    pub institution_name: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub est_semester_cost: f64,
    pub completion_rate: Option<f64>,
    pub median_earnings_10yr: Option<f64>,
}

/// Estimated semester cost assuming off-campus housing
fn off_campus_semester_cost(college: &College, in_state: bool) -> Option<f64> {
    let c = &college.costs;
    let tuition = if in_state {
        c.tuition_in_state
    } else {
        c.tuition_out_of_state
    };
    let parts = [tuition, c.room_board_off_campus, c.books_supplies, c.other_expenses];
    if parts.iter().all(Option::is_none) {
        return None;
    }
    Some(parts.iter().flatten().sum::<f64>() / 2.0)
}

/// Colleges whose estimated semester cost fits `budget_per_semester`,
/// cheapest first
pub fn find_alternatives<'a>(
    colleges: impl IntoIterator<Item = &'a College>,
    budget_per_semester: f64,
    state: Option<&str>,
    in_state: bool,
    limit: usize,
) -> Result<Vec<Alternative>> {
    check_amount("budget_per_semester", budget_per_semester)?;

    let mut found: Vec<Alternative> = colleges
        .into_iter()
        .filter(|c| match state {
            Some(s) => c.state.as_deref().is_some_and(|cs| cs.eq_ignore_ascii_case(s)),
            None => true,
        })
        .filter_map(|c| {
            let cost = off_campus_semester_cost(c, in_state)?;
            (cost <= budget_per_semester).then(|| Alternative {
                institution_id: c.id,
                institution_name: c.name.clone(),
                city: c.city.clone(),
                state: c.state.clone(),
                est_semester_cost: cost,
                completion_rate: c.outcomes.completion_rate,
                median_earnings_10yr: c.outcomes.median_earnings_10yr,
            })
        })
        .collect();

    found.sort_by(|a, b| {
        OrderedFloat(a.est_semester_cost)
            .cmp(&OrderedFloat(b.est_semester_cost))
            .then(a.institution_id.cmp(&b.institution_id))
    });
    found.truncate(limit);
    Ok(found)
}

fn check_amount(field: &'static str, value: f64) -> std::result::Result<(), ValidationError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ValidationError::invalid_field(
            field,
            format!("must be a non-negative number, got {value}"),
        ));
    }
    Ok(())
}
