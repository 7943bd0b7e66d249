use ahash::AHashMap;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use edualign_core::PreferenceVector;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// How many institutions the summary lists
pub const TOP_INSTITUTIONS: usize = 10;

/// One served match request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    /// Dimension key -> slider value
    pub preferences: BTreeMap<String, f32>,
    pub top_n: usize,
    pub used_fallback: bool,
    pub institution_ids: Vec<u32>,
}

impl HistoryEntry {
    pub fn new(
        prefs: &PreferenceVector,
        top_n: usize,
        used_fallback: bool,
        institution_ids: Vec<u32>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            preferences: prefs
                .iter()
                .map(|(dim, weight)| (dim.as_str().to_string(), weight))
                .collect(),
            top_n,
            used_fallback,
            institution_ids,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstitutionCount {
    pub institution_id: u32,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistorySummary {
    pub total_matches: usize,
    pub fallback_count: usize,
    /// Most frequently returned first, ties by id
    pub top_institutions: Vec<InstitutionCount>,
}

/// Append-only JSON lines log of served matches
pub struct MatchHistory {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl MatchHistory {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("opening match history {}", path.display()))?;

        Ok(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one entry and flush it
    pub fn append(&self, entry: &HistoryEntry) -> Result<()> {
        let line = serde_json::to_vec(entry)?;
        let mut writer = self.writer.lock();
        writer.write_all(&line)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }

    /// Append, logging instead of failing
    pub fn record(&self, entry: &HistoryEntry) {
        if let Err(e) = self.append(entry) {
            tracing::warn!(path = %self.path.display(), error = %e, "Failed to record match history");
        }
    }

    /// Every readable entry in file order; unparseable lines are skipped
    pub fn entries(&self) -> Result<Vec<HistoryEntry>> {
        // Flush so readers see everything appended through this handle
        self.writer.lock().flush()?;

        let file = File::open(&self.path)
            .with_context(|| format!("reading match history {}", self.path.display()))?;
        let mut entries = Vec::new();
        for (n, line) in BufReader::new(file).lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str(&line) {
                Ok(entry) => entries.push(entry),
                Err(e) => tracing::warn!(line = n + 1, error = %e, "Skipping corrupt history line"),
            }
        }
        Ok(entries)
    }

    pub fn summary(&self) -> Result<HistorySummary> {
        Ok(summarize(&self.entries()?))
    }
}

pub fn summarize(entries: &[HistoryEntry]) -> HistorySummary {
    let mut counts: AHashMap<u32, usize> = AHashMap::new();
    for id in entries.iter().flat_map(|e| e.institution_ids.iter()) {
        *counts.entry(*id).or_default() += 1;
    }

    let mut top_institutions: Vec<InstitutionCount> = counts
        .into_iter()
        .map(|(institution_id, count)| InstitutionCount {
            institution_id,
            count,
        })
        .collect();
    top_institutions.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then(a.institution_id.cmp(&b.institution_id))
    });
    top_institutions.truncate(TOP_INSTITUTIONS);

    HistorySummary {
        total_matches: entries.len(),
        fallback_count: entries.iter().filter(|e| e.used_fallback).count(),
        top_institutions,
    }
}
