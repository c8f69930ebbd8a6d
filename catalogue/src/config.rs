//! Catalogue configuration.

/// Maximum description length (exclusive), in characters.
pub const MAX_DESCRIPTION_LENGTH: usize = 255;

/// Maximum page count (exclusive).
pub const MAX_BOOKPAGE_LENGTH: u64 = 1200;

/// How each book's nested containers are namespaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NestedPrefixScheme {
    /// `book/{id}/rating` and `book/{id}/comments`: every book owns its
    /// own storage region.
    #[default]
    PerBook,
    /// `rating` and `v` for every book. Matches state written by older
    /// deployments, where all books alias the same nested storage.
    Shared,
}

/// Configuration for a catalogue instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogueConfig {
    /// Storage key of the JSON state record.
    pub state_key: String,
    /// Prefix of the top-level books vector.
    pub books_prefix: String,
    /// Descriptions must be shorter than this many characters.
    pub max_description_len: usize,
    /// Page counts must be below this.
    pub max_page_count: u64,
    /// Namespacing of per-book ratings and comments.
    pub nested_prefixes: NestedPrefixScheme,
}

impl Default for CatalogueConfig {
    fn default() -> Self {
        Self {
            state_key: "STATE".to_string(),
            books_prefix: "books".to_string(),
            max_description_len: MAX_DESCRIPTION_LENGTH,
            max_page_count: MAX_BOOKPAGE_LENGTH,
            nested_prefixes: NestedPrefixScheme::PerBook,
        }
    }
}

impl CatalogueConfig {
    /// Config for reading state laid out by older deployments.
    pub fn shared_prefixes() -> Self {
        Self {
            nested_prefixes: NestedPrefixScheme::Shared,
            ..Self::default()
        }
    }

    /// Prefix of the ratings vector of book `id`.
    pub fn rating_prefix(&self, id: u32) -> String {
        match self.nested_prefixes {
            NestedPrefixScheme::PerBook => format!("book/{id}/rating"),
            NestedPrefixScheme::Shared => "rating".to_string(),
        }
    }

    /// Prefix of the comments map of book `id`.
    pub fn comments_prefix(&self, id: u32) -> String {
        match self.nested_prefixes {
            NestedPrefixScheme::PerBook => format!("book/{id}/comments"),
            NestedPrefixScheme::Shared => "v".to_string(),
        }
    }
}
