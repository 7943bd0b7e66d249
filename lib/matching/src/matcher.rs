//! Generative matching with a deterministic fallback.

use edualign_core::{
    College, CollegePrediction, MatchResult, PreferenceVector, StudentProfile, ValidationError,
};
use std::sync::Arc;
use std::time::Duration;

use crate::explain;
use crate::generation::{GenerationError, Generator};
use crate::narrative::{build_narrative_prompt, parse_narratives, Narratives};
use crate::prompt::{build_prompt, parse_reply};
use crate::rank::rank_candidates;

#[derive(Debug, Clone)]
pub struct MatcherConfig {
    /// Candidates sent to the generator (raised to `top_n` when smaller)
    pub prefilter_size: usize,
    pub default_top_n: usize,
    pub max_top_n: usize,
    /// Gap below which a dimension is reported as a trade-off
    pub tradeoff_threshold: f32,
    pub generation_timeout: Duration,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            prefilter_size: 20,
            default_top_n: 4,
            max_top_n: 50,
            tradeoff_threshold: 0.2,
            generation_timeout: Duration::from_secs(15),
        }
    }
}

/// Which path produced a ranking
#[derive(Debug, Clone, PartialEq)]
pub enum MatchOutcome {
    Generated(Vec<MatchResult>),
    Fallback(Vec<MatchResult>),
}

impl MatchOutcome {
    pub fn used_fallback(&self) -> bool {
        matches!(self, MatchOutcome::Fallback(_))
    }

    pub fn results(&self) -> &[MatchResult] {
        match self {
            MatchOutcome::Generated(r) | MatchOutcome::Fallback(r) => r,
        }
    }

    pub fn into_results(self) -> Vec<MatchResult> {
        match self {
            MatchOutcome::Generated(r) | MatchOutcome::Fallback(r) => r,
        }
    }
}

/// Ranks candidate colleges for a student.
///
/// Stateless across calls: each request is answered from its own inputs.
pub struct Matcher {
    config: MatcherConfig,
    generator: Option<Arc<dyn Generator>>,
}

impl Matcher {
    /// A matcher that always uses similarity ranking
    pub fn new(config: MatcherConfig) -> Self {
        Self {
            config,
            generator: None,
        }
    }

    pub fn with_generator(config: MatcherConfig, generator: Arc<dyn Generator>) -> Self {
        Self {
            config,
            generator: Some(generator),
        }
    }

    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    pub fn has_generator(&self) -> bool {
        self.generator.is_some()
    }

    pub fn check_top_n(&self, top_n: usize) -> Result<usize, ValidationError> {
        if top_n == 0 || top_n > self.config.max_top_n {
            return Err(ValidationError::InvalidTopN {
                actual: top_n,
                max: self.config.max_top_n,
            });
        }
        Ok(top_n)
    }

    /// Rank `candidates` and return at most `top_n` results.
    ///
    /// Never fails: any generation problem selects the fallback ranking.
    pub async fn match_colleges(
        &self,
        prefs: &PreferenceVector,
        profile: Option<&StudentProfile>,
        candidates: &[Arc<College>],
        top_n: usize,
    ) -> MatchOutcome {
        let Some(generator) = self.generator.as_ref() else {
            return self.fallback(prefs, candidates, top_n);
        };

        match self.generate(generator.as_ref(), prefs, profile, candidates, top_n).await {
            Ok(Some(results)) => MatchOutcome::Generated(results),
            Ok(None) => MatchOutcome::Fallback(Vec::new()),
            Err(e) => {
                tracing::warn!(
                    generator = generator.name(),
                    error = %e,
                    "Generated matching failed, using similarity fallback"
                );
                self.fallback(prefs, candidates, top_n)
            }
        }
    }

    /// `Ok(None)` when there is nothing to rank
    async fn generate(
        &self,
        generator: &dyn Generator,
        prefs: &PreferenceVector,
        profile: Option<&StudentProfile>,
        candidates: &[Arc<College>],
        top_n: usize,
    ) -> Result<Option<Vec<MatchResult>>, GenerationError> {
        let shortlist = rank_candidates(prefs, candidates, self.config.prefilter_size.max(top_n));
        if shortlist.is_empty() {
            return Ok(None);
        }

        let prompt = build_prompt(prefs, profile, &shortlist, top_n);
        let timeout = self.config.generation_timeout;
        let text = tokio::time::timeout(timeout, generator.generate(&prompt))
            .await
            .map_err(|_| GenerationError::Timeout(timeout))??;

        let results = parse_reply(&text, &shortlist, top_n)?;
        tracing::debug!(
            generator = generator.name(),
            shortlisted = shortlist.len(),
            returned = results.len(),
            "Generated matching succeeded"
        );
        Ok(Some(results))
    }

    /// Advice text for each prediction, generated where possible.
    ///
    /// Like [`match_colleges`](Self::match_colleges) this never fails; colleges
    /// without generated text get the templated narrative.
    pub async fn narrate(
        &self,
        profile: &StudentProfile,
        predictions: &[CollegePrediction],
    ) -> Narratives {
        if predictions.is_empty() {
            return Narratives::fallback(predictions);
        }
        let Some(generator) = self.generator.as_ref() else {
            return Narratives::fallback(predictions);
        };

        let prompt = build_narrative_prompt(profile, predictions);
        let timeout = self.config.generation_timeout;
        let reply = tokio::time::timeout(timeout, generator.generate(&prompt))
            .await
            .map_err(|_| GenerationError::Timeout(timeout))
            .and_then(|text| text)
            .and_then(|text| parse_narratives(&text, predictions));

        match reply {
            Ok(generated) => Narratives::merge(generated, predictions),
            Err(e) => {
                tracing::warn!(
                    generator = generator.name(),
                    error = %e,
                    "Narrative generation failed, using templated narratives"
                );
                Narratives::fallback(predictions)
            }
        }
    }

    /// Cosine similarity ranking with templated explanations
    pub fn fallback(
        &self,
        prefs: &PreferenceVector,
        candidates: &[Arc<College>],
        top_n: usize,
    ) -> MatchOutcome {
        let results = rank_candidates(prefs, candidates, top_n)
            .iter()
            .map(|scored| explain::explain(prefs, scored, self.config.tradeoff_threshold))
            .collect();
        MatchOutcome::Fallback(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::Prompt;
    use edualign_core::{CostProfile, ExperienceDimension, Outcomes, ProfileVector, DIMENSION_COUNT};
    use futures_util::future::BoxFuture;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn college(id: u32, scores: [f32; DIMENSION_COUNT]) -> Arc<College> {
        Arc::new(College {
            id,
            name: format!("College {id}"),
            city: Some("Springfield".to_string()),
            state: Some("IL".to_string()),
            control: Some(1),
            undergrad_enrollment: None,
            costs: CostProfile::default(),
            outcomes: Outcomes::default(),
            profile: Some(ProfileVector::new(scores)),
        })
    }

    fn catalog() -> Vec<Arc<College>> {
        vec![
            college(1, [0.9, 0.2, 0.5, 0.8, 0.5, 0.5, 0.5, 0.5]),
            college(2, [0.3, 0.9, 0.5, 0.5, 0.5, 0.5, 0.5, 0.5]),
            college(3, [0.6, 0.6, 0.6, 0.6, 0.6, 0.6, 0.6, 0.6]),
        ]
    }

    fn student() -> PreferenceVector {
        let mut p = PreferenceVector::default();
        p.set(ExperienceDimension::AcademicIntensity, 9.0);
        p.set(ExperienceDimension::SocialLife, 3.0);
        p.set(ExperienceDimension::CareerSupport, 8.0);
        p
    }

    enum Behaviour {
        Fail,
        Slow,
        Reply(String),
    }

    struct MockGenerator {
        behaviour: Behaviour,
        calls: AtomicUsize,
    }

    impl MockGenerator {
        fn new(behaviour: Behaviour) -> Arc<Self> {
            Arc::new(Self {
                behaviour,
                calls: AtomicUsize::new(0),
            })
        }
    }

    impl Generator for MockGenerator {
        fn name(&self) -> &str {
            "mock"
        }

        fn generate<'a>(&'a self, _prompt: &'a Prompt) -> BoxFuture<'a, Result<String, GenerationError>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Box::pin(async move {
                match &self.behaviour {
                    Behaviour::Fail => Err(GenerationError::Status(500)),
                    Behaviour::Slow => {
                        tokio::time::sleep(Duration::from_secs(60)).await;
                        Ok(String::new())
                    }
                    Behaviour::Reply(text) => Ok(text.clone()),
                }
            })
        }
    }

    fn matcher_with(generator: Arc<MockGenerator>) -> Matcher {
        let config = MatcherConfig {
            generation_timeout: Duration::from_millis(50),
            ..Default::default()
        };
        Matcher::with_generator(config, generator)
    }

    #[tokio::test]
    async fn test_no_generator_uses_fallback() {
        let matcher = Matcher::new(MatcherConfig::default());
        let outcome = matcher.match_colleges(&student(), None, &catalog(), 2).await;

        assert!(outcome.used_fallback());
        let results = outcome.results();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].institution_id, 1);
        assert!(results[0].similarity_score >= results[1].similarity_score);
        assert!(results[0].explanation.contains("College 1"));
    }

    #[tokio::test]
    async fn test_valid_reply_is_generated() {
        let reply = r#"{"matches":[
            {"institution_id":3,"college_name":"College 3","similarity_score":0.88,"explanation":"Balanced.","strengths":["inclusivity"],"tradeoffs":[]},
            {"institution_id":1,"college_name":"College 1","similarity_score":0.81,"explanation":"Rigorous.","strengths":["academic_intensity"],"tradeoffs":["social_life"]}
        ]}"#;
        let generator = MockGenerator::new(Behaviour::Reply(reply.to_string()));
        let matcher = matcher_with(generator.clone());

        let outcome = matcher.match_colleges(&student(), None, &catalog(), 2).await;
        assert!(!outcome.used_fallback());
        let ids: Vec<u32> = outcome.results().iter().map(|r| r.institution_id).collect();
        assert_eq!(ids, vec![3, 1]);
        assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failures_fall_back_to_similarity() {
        let expected = Matcher::new(MatcherConfig::default())
            .fallback(&student(), &catalog(), 3)
            .into_results();

        for behaviour in [
            Behaviour::Fail,
            Behaviour::Slow,
            Behaviour::Reply("I think College 1 is great".to_string()),
            Behaviour::Reply(r#"{"matches":[{"institution_id":42,"similarity_score":0.9,"explanation":"?"}]}"#.to_string()),
        ] {
            let generator = MockGenerator::new(behaviour);
            let outcome = matcher_with(generator.clone())
                .match_colleges(&student(), None, &catalog(), 3)
                .await;
            assert!(outcome.used_fallback());
            assert_eq!(outcome.into_results(), expected);
            assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
        }
    }

    #[tokio::test]
    async fn test_empty_candidates_skip_generation() {
        let generator = MockGenerator::new(Behaviour::Fail);
        let outcome = matcher_with(generator.clone())
            .match_colleges(&student(), None, &[], 4)
            .await;

        assert_eq!(outcome, MatchOutcome::Fallback(Vec::new()));
        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_fallback_is_deterministic() {
        let matcher = Matcher::new(MatcherConfig::default());
        let a = matcher.fallback(&student(), &catalog(), 3);
        let b = matcher.fallback(&student(), &catalog(), 3);
        assert_eq!(a, b);
        assert_eq!(a.results().len(), 3);
        for r in a.results() {
            assert!((0.0..=1.0).contains(&r.similarity_score));
            assert!(r.strengths.len() <= 3 && r.tradeoffs.len() <= 2);
        }
    }

    fn predictions() -> Vec<CollegePrediction> {
        use edualign_core::predictions::{predict, EarningsDistribution};

        catalog()
            .iter()
            .take(2)
            .map(|c| predict(&StudentProfile::default(), c, &EarningsDistribution::default()))
            .collect()
    }

    #[tokio::test]
    async fn test_narrate_uses_generated_text() {
        let reply = r#"{"narratives":[
            {"college_name":"College 1","narrative":"Apply early."},
            {"college_name":"College 2","narrative":"A solid option."}
        ]}"#;
        let generator = MockGenerator::new(Behaviour::Reply(reply.to_string()));
        let narratives = matcher_with(generator.clone())
            .narrate(&StudentProfile::default(), &predictions())
            .await;

        assert!(!narratives.used_fallback);
        assert_eq!(narratives.texts, vec!["Apply early.", "A solid option."]);
        assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_narrate_falls_back_on_failure() {
        let expected = Narratives::fallback(&predictions());
        for behaviour in [
            Behaviour::Fail,
            Behaviour::Slow,
            Behaviour::Reply("no json here".to_string()),
        ] {
            let narratives = matcher_with(MockGenerator::new(behaviour))
                .narrate(&StudentProfile::default(), &predictions())
                .await;
            assert_eq!(narratives, expected);
        }

        let without_generator = Matcher::new(MatcherConfig::default())
            .narrate(&StudentProfile::default(), &predictions())
            .await;
        assert_eq!(without_generator, expected);
    }

    #[tokio::test]
    async fn test_narrate_nothing_skips_generation() {
        let generator = MockGenerator::new(Behaviour::Fail);
        let narratives = matcher_with(generator.clone())
            .narrate(&StudentProfile::default(), &[])
            .await;
        assert!(narratives.texts.is_empty());
        assert!(!narratives.used_fallback);
        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_check_top_n_bounds() {
        let matcher = Matcher::new(MatcherConfig::default());
        assert_eq!(matcher.check_top_n(4), Ok(4));
        assert_eq!(matcher.check_top_n(50), Ok(50));
        assert_eq!(
            matcher.check_top_n(0),
            Err(ValidationError::InvalidTopN { actual: 0, max: 50 })
        );
        assert!(matcher.check_top_n(51).is_err());
    }
}
