//! Website dictionaries
//!
//! Keys are normalized site names (lowercase, no protocol, no "www.",
//! no TLD suffix). Entries are read-only for the whole session.

use crate::error::{JarvisError, JarvisResult};
use std::collections::BTreeMap;
use std::path::Path;

/// Source of name -> URL mappings for the resolver
pub trait SiteProvider {
    /// Exact lookup of a normalized key
    fn lookup(&self, key: &str) -> Option<&str>;

    /// All keys, in a stable order
    fn keys(&self) -> Box<dyn Iterator<Item = &str> + '_>;

    fn len(&self) -> usize {
        self.keys().count()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-memory dictionary, ordered by key
#[derive(Debug, Clone, Default)]
pub struct StaticSites {
    entries: BTreeMap<String, String>,
}

impl StaticSites {
    pub fn new<K, V, I>(entries: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Load a JSON object of `{"name": "url"}` pairs
    pub fn load(path: &Path) -> JarvisResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let entries: BTreeMap<String, String> = serde_json::from_str(&content).map_err(|e| {
            JarvisError::Config(format!("Invalid website dictionary {}: {}", path.display(), e))
        })?;
        Ok(Self { entries })
    }

    /// The dictionary shipped with Jarvis
    pub fn builtin() -> Self {
        Self::new([
            ("amazon", "https://www.amazon.com"),
            ("bing", "https://www.bing.com"),
            ("chatgpt", "https://chat.openai.com"),
            ("discord", "https://discord.com"),
            ("facebook", "https://www.facebook.com"),
            ("flipkart", "https://www.flipkart.com"),
            ("github", "https://github.com"),
            ("gmail", "https://mail.google.com"),
            ("google", "https://www.google.com"),
            ("hotstar", "https://www.hotstar.com"),
            ("instagram", "https://www.instagram.com"),
            ("linkedin", "https://www.linkedin.com"),
            ("maps", "https://maps.google.com"),
            ("netflix", "https://www.netflix.com"),
            ("outlook", "https://outlook.live.com"),
            ("reddit", "https://www.reddit.com"),
            ("spotify", "https://open.spotify.com"),
            ("stackoverflow", "https://stackoverflow.com"),
            ("telegram", "https://web.telegram.org"),
            ("twitter", "https://twitter.com"),
            ("whatsapp", "https://web.whatsapp.com"),
            ("wikipedia", "https://www.wikipedia.org"),
            ("yahoo", "https://www.yahoo.com"),
            ("youtube", "https://www.youtube.com"),
        ])
    }
}

impl SiteProvider for StaticSites {
    fn lookup(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    fn keys(&self) -> Box<dyn Iterator<Item = &str> + '_> {
        Box::new(self.entries.keys().map(String::as_str))
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}
