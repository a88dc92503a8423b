//! Spoken punctuation normalization
//!
//! Rewrites dictated phrases such as "dot t x t", "plus" or "open brace"
//! into the literal symbols they name. The rewrite is an ordered pipeline
//! of small stages; see [`PIPELINE`].
//!
//! Stage order is load-bearing: [`Stage::TightenSymbols`] strips spaces
//! around a wide symbol set and [`Stage::SpaceOperators`] later puts single
//! spaces back around a narrower operator set. Swapping them, or moving
//! extension handling after the generic rules, changes the output for
//! input that mixes file names with arithmetic.

use lazy_static::lazy_static;
use regex::{NoExpand, Regex};

lazy_static! {
    /// Spoken word rules, applied top to bottom
    ///
    /// Within a rule the longer phrase is listed first, so "dollar sign"
    /// wins over "dollar" and no stray "sign" is left behind.
    static ref SPOKEN_SYMBOLS: Vec<(Regex, &'static str)> = [
        (&["hash", "pound", "number sign"][..], "#"),
        (&["dollar sign", "dollar"][..], "$"),
        (&["ampersand", "and sign"][..], "&"),
        (&["dot", "period", "full stop"][..], "."),
        (&["comma"][..], ","),
        (&["semicolon"][..], ";"),
        (&["colon"][..], ":"),
        (&["underscore", "under score"][..], "_"),
        (&["dash", "hyphen", "minus"][..], "-"),
        (&["plus sign", "plus", "add"][..], "+"),
        (&["forward slash", "slash"][..], "/"),
        (&["backslash", "back slash"][..], "\\"),
        (&["star", "asterisk"][..], "*"),
        (&["percentage", "percent"][..], "%"),
        (&["equal to", "equals", "equal"][..], "="),
        (&["greater than"][..], ">"),
        (&["less than"][..], "<"),
        (&["pipe", "vertical bar"][..], "|"),
        (&["caret"][..], "^"),
        (&["at the rate", "at"][..], "@"),
        (&["exclamation mark", "exclamation", "bang"][..], "!"),
        (&["question mark", "question"][..], "?"),
        (&["double quote", "quote"][..], "\""),
        (&["single quote", "apostrophe"][..], "'"),
        (&["open parenthesis", "open bracket", "left parenthesis"][..], "("),
        (&["close parenthesis", "close bracket", "right parenthesis"][..], ")"),
        (&["open brace", "left brace"][..], "{"),
        (&["close brace", "right brace"][..], "}"),
        (&["open square bracket", "left square bracket"][..], "["),
        (&["close square bracket", "right square bracket"][..], "]"),
        (&["space", "blank"][..], " "),
        (&["new line", "newline"][..], "\n"),
    ]
    .iter()
    .map(|(words, symbol)| (word_regex(words), *symbol))
    .collect();

    static ref AROUND_SYMBOLS: Regex = Regex::new(r"\s*([/\\.\-+*%=&|^#@!?,:;])\s*").unwrap();
    static ref AROUND_BRACKETS: Regex = Regex::new(r"\s*([()\[\]{}])\s*").unwrap();
    static ref HORIZONTAL_SPACE: Regex = Regex::new(r"[ \t]+").unwrap();
    static ref AROUND_OPERATORS: Regex = Regex::new(r"\s*([+\-*/%=&|^<>])\s*").unwrap();
    static ref ANY_SPACE: Regex = Regex::new(r"\s+").unwrap();
    static ref BEFORE_PUNCTUATION: Regex = Regex::new(r"\s*([.,?!])").unwrap();

    static ref DEFAULT_NORMALIZER: PunctuationNormalizer = PunctuationNormalizer::default();
}

/// Case-insensitive whole-word match of any phrase, earlier phrases winning
fn word_regex(words: &[&str]) -> Regex {
    let alternatives: Vec<String> = words.iter().map(|w| regex::escape(w)).collect();
    Regex::new(&format!(r"(?i)\b(?:{})\b", alternatives.join("|"))).unwrap()
}

/// One step of the normalization pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// "dot t x t" -> ".txt"
    Extensions,
    /// "comma" -> ",", "open brace" -> "{", ...
    SpokenSymbols,
    /// "file . txt" -> "file.txt"
    TightenSymbols,
    /// "( a )" -> "(a)"
    TightenBrackets,
    /// runs of spaces/tabs -> one space
    CollapseSpaces,
    /// "a+b" -> "a + b"
    SpaceOperators,
    /// any whitespace run -> one space
    CollapseWhitespace,
    /// "word ." -> "word."
    StripBeforePunctuation,
    Trim,
}

/// Fixed application order
pub const PIPELINE: [Stage; 9] = [
    Stage::Extensions,
    Stage::SpokenSymbols,
    Stage::TightenSymbols,
    Stage::TightenBrackets,
    Stage::CollapseSpaces,
    Stage::SpaceOperators,
    Stage::CollapseWhitespace,
    Stage::StripBeforePunctuation,
    Stage::Trim,
];

/// Rule set for dictated symbols and file extensions
#[derive(Debug, Clone)]
pub struct PunctuationNormalizer {
    extension_rules: Vec<(Regex, String)>,
}

impl Default for PunctuationNormalizer {
    fn default() -> Self {
        Self::new(&[
            ("txt", &["t x t", "txt"][..]),
            ("py", &["p y", "py"][..]),
            // before "c", which would otherwise claim "dot c p p"
            ("cpp", &["c p p", "cpp", "c plus plus"][..]),
            ("c", &["c"][..]),
        ])
    }
}

impl PunctuationNormalizer {
    /// Build a normalizer for the given extensions and their spoken forms
    ///
    /// Rules are tried in the order given. Spelled-out variants ("t x t")
    /// tolerate any whitespace between the letters.
    pub fn new(extensions: &[(&str, &[&str])]) -> Self {
        let mut extension_rules = Vec::new();
        for (ext, variants) in extensions {
            for variant in *variants {
                let letters: Vec<String> =
                    variant.split_whitespace().map(regex::escape).collect();
                let pattern = format!(r"(?i)\bdot\s+{}\b", letters.join(r"\s*"));
                // escaped literals cannot produce an invalid pattern
                if let Ok(re) = Regex::new(&pattern) {
                    extension_rules.push((re, format!(".{}", ext)));
                }
            }
        }
        Self { extension_rules }
    }

    /// Run the whole pipeline
    pub fn normalize(&self, text: &str) -> String {
        PIPELINE
            .iter()
            .fold(text.to_string(), |acc, stage| self.apply(*stage, &acc))
    }

    /// Run a single stage
    pub fn apply(&self, stage: Stage, text: &str) -> String {
        match stage {
            Stage::Extensions => {
                let mut out = text.to_string();
                for (re, ext) in &self.extension_rules {
                    out = re.replace_all(&out, NoExpand(ext)).into_owned();
                }
                out
            }
            Stage::SpokenSymbols => {
                let mut out = text.to_string();
                for (re, symbol) in SPOKEN_SYMBOLS.iter() {
                    out = re.replace_all(&out, NoExpand(symbol)).into_owned();
                }
                out
            }
            Stage::TightenSymbols => AROUND_SYMBOLS.replace_all(text, "${1}").into_owned(),
            Stage::TightenBrackets => AROUND_BRACKETS.replace_all(text, "${1}").into_owned(),
            Stage::CollapseSpaces => HORIZONTAL_SPACE.replace_all(text, " ").into_owned(),
            Stage::SpaceOperators => AROUND_OPERATORS.replace_all(text, " ${1} ").into_owned(),
            Stage::CollapseWhitespace => ANY_SPACE.replace_all(text, " ").into_owned(),
            Stage::StripBeforePunctuation => {
                BEFORE_PUNCTUATION.replace_all(text, "${1}").into_owned()
            }
            Stage::Trim => text.trim().to_string(),
        }
    }
}

/// Normalize with the default extension set
pub fn normalize(text: &str) -> String {
    DEFAULT_NORMALIZER.normalize(text)
}
