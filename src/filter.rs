use crate::model::{Batch, Language, Mode};

/// Which text fields a search term is matched against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SearchScope {
    /// Admin list: batch name only.
    NameOnly,
    /// Learner list: name or description.
    #[default]
    NameAndDescription,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchFilter {
    pub search: String,
    pub scope: SearchScope,
    pub language: Option<Language>,
    pub mode: Option<Mode>,
}

impl BatchFilter {
    pub fn admin(search: &str) -> Self {
        Self {
            search: search.to_string(),
            scope: SearchScope::NameOnly,
            ..Default::default()
        }
    }

    pub fn learner(search: &str, language: Option<Language>, mode: Option<Mode>) -> Self {
        Self {
            search: search.to_string(),
            scope: SearchScope::NameAndDescription,
            language,
            mode,
        }
    }

    pub fn matches(&self, batch: &Batch) -> bool {
        let needle = self.search.trim().to_lowercase();
        let text_ok = needle.is_empty()
            || batch.name.to_lowercase().contains(&needle)
            || (self.scope == SearchScope::NameAndDescription
                && batch.description.to_lowercase().contains(&needle));
        let language_ok = self.language.map_or(true, |l| batch.language == l);
        let mode_ok = self.mode.map_or(true, |m| batch.mode == m);
        text_ok && language_ok && mode_ok
    }

    pub fn apply<'a>(&self, batches: &'a [Batch]) -> Vec<&'a Batch> {
        batches.iter().filter(|b| self.matches(b)).collect()
    }
}
