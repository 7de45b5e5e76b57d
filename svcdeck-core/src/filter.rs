use crate::model::Service;

/// Case-insensitive substring filter over service name and description.
#[derive(Clone, Debug, Default)]
pub struct ServiceFilter {
    term: String,
    lowered: String,
}

impl ServiceFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_term(term: impl Into<String>) -> Self {
        let mut filter = Self::new();
        filter.set(term.into());
        filter
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn is_empty(&self) -> bool {
        self.term.is_empty()
    }

    pub fn set(&mut self, term: String) {
        self.lowered = term.to_lowercase();
        self.term = term;
    }

    pub fn push(&mut self, c: char) {
        let mut term = std::mem::take(&mut self.term);
        term.push(c);
        self.set(term);
    }

    pub fn pop(&mut self) {
        let mut term = std::mem::take(&mut self.term);
        term.pop();
        self.set(term);
    }

    pub fn clear(&mut self) {
        self.term.clear();
        self.lowered.clear();
    }

    /// A match on either field qualifies.
    pub fn matches(&self, service: &Service) -> bool {
        if self.lowered.is_empty() {
            return true;
        }
        service.name.to_lowercase().contains(&self.lowered)
            || service.description.to_lowercase().contains(&self.lowered)
    }

    /// Apply to the full list, keeping the order it was received in.
    pub fn apply<'a>(&'a self, services: &'a [Service]) -> impl Iterator<Item = &'a Service> + 'a {
        services.iter().filter(move |s| self.matches(s))
    }
}
