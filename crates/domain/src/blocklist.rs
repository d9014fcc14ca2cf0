/// Exact and `*.suffix` wildcard block list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockedDomains {
    entries: Vec<String>,
}

impl BlockedDomains {
    pub fn new(entries: Vec<String>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|e| e.trim().to_lowercase())
                .filter(|e| !e.is_empty())
                .collect(),
        }
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `*.example.com` blocks any name ending in `.example.com`, not the apex.
    pub fn is_blocked(&self, domain: &str) -> bool {
        if self.entries.is_empty() {
            return false;
        }

        let domain = domain.trim_end_matches('.').to_lowercase();
        self.entries.iter().any(|entry| match entry.strip_prefix('*') {
            Some(suffix) if suffix.starts_with('.') => domain.ends_with(suffix),
            _ => *entry == domain,
        })
    }
}

impl From<Vec<String>> for BlockedDomains {
    fn from(entries: Vec<String>) -> Self {
        Self::new(entries)
    }
}
