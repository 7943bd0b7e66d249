use edualign_core::Vectorizer;
use edualign_matching::Matcher;
use edualign_storage::{CollegeCatalog, MatchHistory};

/// Everything the handlers share; read-only apart from the history writer
pub struct AppState {
    pub catalog: CollegeCatalog,
    pub vectorizer: Vectorizer,
    pub matcher: Matcher,
    pub history: Option<MatchHistory>,
}

impl AppState {
    pub fn new(catalog: CollegeCatalog, vectorizer: Vectorizer, matcher: Matcher) -> Self {
        Self {
            catalog,
            vectorizer,
            matcher,
            history: None,
        }
    }

    pub fn with_history(mut self, history: MatchHistory) -> Self {
        self.history = Some(history);
        self
    }
}
