//! Website resolution
//!
//! Turns an utterance like "open youtub and github dot com" into the set
//! of URLs to open. Exact dictionary keys win outright; anything else is
//! scored against every key and handed to a [`DisambiguationPolicy`].

pub mod launcher;
pub mod policy;
pub mod sites;

pub use launcher::{BrowserLauncher, SystemLauncher};
pub use policy::{parse_choice, Choice, Console, DisambiguationPolicy, ScriptedPolicy};
pub use sites::{SiteProvider, StaticSites};

use crate::session_log::SessionLog;
use crate::utils::{find_matches, MatchCandidate};
use anyhow::Result;
use std::io::{BufRead, Write};
use tracing::{debug, info, warn};

pub const DEFAULT_MIN_SCORE: f64 = 0.82;
pub const DEFAULT_MAX_RESULTS: usize = 5;

const PROTOCOLS: [&str; 2] = ["http://", "https://"];
const TLD_SUFFIXES: [&str; 4] = [".com", ".in", ".org", ".net"];
const EXIT_WORDS: [&str; 3] = ["exit", "quit", "q"];

/// Reduce a spoken or typed token to a dictionary key
///
/// "WWW.YouTube.com," -> "youtube"
pub fn normalize_word(word: &str) -> String {
    let lower = word.trim().to_lowercase();
    let mut w = lower.trim_matches(|c: char| ",.!?/:\\|".contains(c));

    for prefix in PROTOCOLS {
        if let Some(rest) = w.strip_prefix(prefix) {
            w = rest;
            break;
        }
    }

    w = w.strip_prefix("www.").unwrap_or(w);

    for suffix in TLD_SUFFIXES {
        if let Some(rest) = w.strip_suffix(suffix) {
            w = rest;
            break;
        }
    }

    w.to_string()
}

/// Outcome of looking up one normalized token
#[derive(Debug, Clone, PartialEq)]
pub enum SiteMatch {
    Exact(String),
    /// Best first, never empty
    Candidates(Vec<MatchCandidate>),
}

/// URLs chosen for one utterance, in first-seen order without duplicates
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution {
    pub urls: Vec<String>,
}

impl Resolution {
    pub fn success(&self) -> bool {
        !self.urls.is_empty()
    }

    fn add(&mut self, url: &str) {
        if !self.urls.iter().any(|u| u == url) {
            self.urls.push(url.to_string());
        }
    }
}

/// Matches spoken names against a site dictionary
pub struct WebsiteResolver<P> {
    sites: P,
    min_score: f64,
    max_results: usize,
}

impl<P: SiteProvider> WebsiteResolver<P> {
    pub fn new(sites: P) -> Self {
        Self::with_limits(sites, DEFAULT_MIN_SCORE, DEFAULT_MAX_RESULTS)
    }

    pub fn with_limits(sites: P, min_score: f64, max_results: usize) -> Self {
        Self {
            sites,
            min_score,
            max_results,
        }
    }

    /// Exact key, or the fuzzy candidates above the threshold
    pub fn match_token(&self, key: &str) -> Option<SiteMatch> {
        if let Some(url) = self.sites.lookup(key) {
            return Some(SiteMatch::Exact(url.to_string()));
        }

        let candidates = find_matches(key, self.sites.keys(), self.max_results, self.min_score);
        if candidates.is_empty() {
            None
        } else {
            Some(SiteMatch::Candidates(candidates))
        }
    }

    /// Resolve every whitespace-separated token of `utterance`
    pub fn resolve(&self, utterance: &str, policy: &mut dyn DisambiguationPolicy) -> Resolution {
        let mut resolution = Resolution::default();

        for original in utterance.split_whitespace() {
            let key = normalize_word(original);
            let candidates = match self.match_token(&key) {
                None => continue,
                Some(SiteMatch::Exact(url)) => {
                    debug!("Exact match '{}' -> {}", key, url);
                    resolution.add(&url);
                    continue;
                }
                Some(SiteMatch::Candidates(candidates)) => candidates,
            };

            if let [candidate] = candidates.as_slice() {
                if policy.confirm(original, candidate) {
                    self.add_key(&mut resolution, &candidate.key);
                }
                continue;
            }

            match policy.choose(original, &candidates) {
                Choice::Pick(idx) => {
                    if let Some(candidate) = candidates.get(idx) {
                        self.add_key(&mut resolution, &candidate.key);
                    }
                }
                Choice::All => {
                    for candidate in &candidates {
                        self.add_key(&mut resolution, &candidate.key);
                    }
                }
                Choice::Skip => {}
                Choice::Invalid => debug!("Invalid choice for '{}', skipping", original),
            }
        }

        resolution
    }

    fn add_key(&self, resolution: &mut Resolution, key: &str) {
        if let Some(url) = self.sites.lookup(key) {
            resolution.add(url);
        }
    }
}

/// Resolver plus the side effects of one web turn: opening and logging
pub struct WebSession<P, L> {
    resolver: WebsiteResolver<P>,
    launcher: L,
    log: SessionLog,
}

impl<P: SiteProvider, L: BrowserLauncher> WebSession<P, L> {
    pub fn new(resolver: WebsiteResolver<P>, launcher: L, log: SessionLog) -> Self {
        Self {
            resolver,
            launcher,
            log,
        }
    }

    pub fn launcher(&self) -> &L {
        &self.launcher
    }

    /// Resolve, open, report and log one utterance
    ///
    /// A failing log write is reported and otherwise ignored.
    pub fn handle(&mut self, utterance: &str, policy: &mut dyn DisambiguationPolicy) -> Resolution {
        let resolution = self.resolver.resolve(utterance, policy);

        if resolution.success() {
            let mut opened = 0;
            for url in &resolution.urls {
                match self.launcher.open(url) {
                    Ok(()) => opened += 1,
                    Err(e) => warn!("⚠️ Could not open {}: {:#}", url, e),
                }
            }
            info!("🌐 Opened {} website(s) for '{}'", opened, utterance);
            policy.notify(&format!("Opened {} website(s).", opened));
        } else {
            policy.notify("No valid website names found.");
        }

        if let Err(e) = self.log.append(utterance, Some(resolution.success())) {
            warn!("Session log write failed: {:#}", e);
            policy.notify(&format!(
                "[LOG ERROR] There is a problem writing to {}: {:#}",
                self.log.path().display(),
                e
            ));
        }

        resolution
    }
}

/// Interactive "web name" loop; returns on an exit word or end of input
pub fn run_prompt_loop<R, W, P, L>(
    console: &mut Console<R, W>,
    session: &mut WebSession<P, L>,
) -> Result<()>
where
    R: BufRead,
    W: Write,
    P: SiteProvider,
    L: BrowserLauncher,
{
    while let Some(line) = console.ask("web name (or 'exit'): ")? {
        let input = line.trim();

        if EXIT_WORDS.contains(&input.to_lowercase().as_str()) {
            console.say("Exiting...");
            break;
        }
        if input.is_empty() {
            continue;
        }

        session.handle(input, console);
    }
    Ok(())
}
