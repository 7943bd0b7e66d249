use ahash::{AHashMap, AHashSet};
use edualign_core::{College, CollegeRecord, EarningsDistribution, Error, Result, ScoreScale};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;

/// Read-only college catalog, loaded once at startup
#[derive(Debug, Default)]
pub struct CollegeCatalog {
    /// Ordered by institution id
    colleges: Vec<Arc<College>>,
    by_id: AHashMap<u32, usize>,
    /// Subset of `colleges` with a complete experience profile
    candidates: Vec<Arc<College>>,
    earnings: EarningsDistribution,
}

impl CollegeCatalog {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load a JSON array of college records
    pub fn load<P: AsRef<Path>>(path: P, scale: ScoreScale) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let records: Vec<CollegeRecord> = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| Error::Serialization(format!("{}: {}", path.display(), e)))?;

        let catalog = Self::from_records(records, scale);
        tracing::info!(
            path = %path.display(),
            colleges = catalog.len(),
            candidates = catalog.candidate_count(),
            "Loaded college catalog"
        );
        Ok(catalog)
    }

    /// Like [`load`](Self::load), but a missing file gives an empty catalog
    pub fn load_or_empty<P: AsRef<Path>>(path: P, scale: ScoreScale) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::warn!(path = %path.display(), "College catalog not found, starting empty");
            return Ok(Self::empty());
        }
        Self::load(path, scale)
    }

    pub fn from_records(records: Vec<CollegeRecord>, scale: ScoreScale) -> Self {
        let mut colleges: Vec<College> = Vec::with_capacity(records.len());
        let mut seen = AHashSet::with_capacity(records.len());

        for record in records {
            let (college, problem) = record.into_college(scale);
            if let Some(problem) = problem {
                tracing::debug!(
                    id = college.id,
                    error = %problem,
                    "Experience scores unusable, excluded from matching"
                );
            }
            if !seen.insert(college.id) {
                tracing::warn!(id = college.id, "Duplicate institution id, keeping first record");
                continue;
            }
            colleges.push(college);
        }

        colleges.sort_by_key(|c| c.id);
        let colleges: Vec<Arc<College>> = colleges.into_iter().map(Arc::new).collect();
        let by_id = colleges
            .iter()
            .enumerate()
            .map(|(i, c)| (c.id, i))
            .collect();
        let candidates = colleges
            .iter()
            .filter(|c| c.is_candidate())
            .cloned()
            .collect();
        let earnings = EarningsDistribution::from_colleges(colleges.iter().map(|c| c.as_ref()));

        Self {
            colleges,
            by_id,
            candidates,
            earnings,
        }
    }

    pub fn get(&self, id: u32) -> Option<&Arc<College>> {
        self.by_id.get(&id).map(|&i| &self.colleges[i])
    }

    /// Case-insensitive name substring and exact state filter, in id order
    pub fn search(&self, name: Option<&str>, state: Option<&str>, limit: usize) -> Vec<Arc<College>> {
        let needle = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_lowercase);
        let state = state.map(str::trim).filter(|s| !s.is_empty());

        self.colleges
            .iter()
            .filter(|c| {
                needle
                    .as_deref()
                    .map_or(true, |n| c.name.to_lowercase().contains(n))
            })
            .filter(|c| {
                state.map_or(true, |s| {
                    c.state.as_deref().is_some_and(|cs| cs.eq_ignore_ascii_case(s))
                })
            })
            .take(limit)
            .cloned()
            .collect()
    }

    /// Colleges eligible for matching
    pub fn candidates(&self) -> &[Arc<College>] {
        &self.candidates
    }

    /// Median earnings of every college that reports them
    pub fn earnings(&self) -> &EarningsDistribution {
        &self.earnings
    }

    pub fn all(&self) -> &[Arc<College>] {
        &self.colleges
    }

    pub fn len(&self) -> usize {
        self.colleges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colleges.is_empty()
    }

    pub fn candidate_count(&self) -> usize {
        self.candidates.len()
    }
}
