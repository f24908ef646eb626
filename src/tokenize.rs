//! Turning text into token sequences for [`levenshtein`](crate::levenshtein::levenshtein).
//!
//! The engine only ever sees tokens. Everything that produces them goes through the
//! [`Tokenizer`] trait, which is implemented by:
//! - the built-in [`TokenizerKind`]s,
//! - [`TokenizerConfig`] (a kind plus normalization options),
//! - any closure `Fn(&str) -> Vec<String>`.
//!
//! Custom tokenizers that can fail (e.g. a learned subword model) implement the trait
//! directly and report failures as [`Error::Tokenizer`].

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::levenshtein::{levenshtein, Levenshtein};

/// Errors raised at the tokenization boundary.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Tokenizer name not recognized by [`TokenizerKind::from_str`].
    #[error("unsupported tokenizer: {0:?} (expected one of: whitespace, simple, character)")]
    UnsupportedTokenizer(String),
    /// A custom tokenizer could not tokenize its input.
    #[error("tokenizer failed: {0}")]
    Tokenizer(String),
}

/// Convenience result type for this module.
pub type Result<T> = std::result::Result<T, Error>;

/// Produces an ordered sequence of tokens from a string.
pub trait Tokenizer {
    /// Split `text` into tokens.
    fn tokenize(&self, text: &str) -> Result<Vec<String>>;
}

impl<F> Tokenizer for F
where
    F: Fn(&str) -> Vec<String>,
{
    fn tokenize(&self, text: &str) -> Result<Vec<String>> {
        Ok(self(text))
    }
}

/// Built-in tokenizers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TokenizerKind {
    /// Split on Unicode whitespace.
    Whitespace,
    /// Split on whitespace and on character-class changes (letters, digits, other).
    ///
    /// Only ASCII `0-9` count as digits; other numeric characters such as `½` fall in the
    /// "other" class.
    ///
    /// Runs of the same punctuation character stay together (`"..."`), different
    /// punctuation characters are split apart (`".,"` gives `"."` and `","`).
    #[default]
    Simple,
    /// One token per non-whitespace `char`.
    Character,
}

impl TokenizerKind {
    /// Lower-case name, as accepted by [`FromStr`].
    pub fn name(&self) -> &'static str {
        match self {
            Self::Whitespace => "whitespace",
            Self::Simple => "simple",
            Self::Character => "character",
        }
    }

    fn split(&self, text: &str) -> Vec<String> {
        match self {
            Self::Whitespace => text.split_whitespace().map(str::to_string).collect(),
            Self::Simple => simple_tokens(text),
            Self::Character => text
                .chars()
                .filter(|c| !c.is_whitespace())
                .map(String::from)
                .collect(),
        }
    }
}

impl fmt::Display for TokenizerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TokenizerKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "whitespace" => Ok(Self::Whitespace),
            "simple" => Ok(Self::Simple),
            "character" | "char" => Ok(Self::Character),
            _ => Err(Error::UnsupportedTokenizer(s.to_string())),
        }
    }
}

impl Tokenizer for TokenizerKind {
    fn tokenize(&self, text: &str) -> Result<Vec<String>> {
        let tokens = self.split(text);
        debug!(kind = self.name(), tokens = tokens.len(), "tokenized text");
        Ok(tokens)
    }
}

/// A built-in tokenizer plus normalization options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TokenizerConfig {
    /// Which splitter to use.
    pub kind: TokenizerKind,
    /// Lower-case the text before splitting.
    pub lowercase: bool,
}

impl TokenizerConfig {
    /// Default configuration: [`TokenizerKind::Simple`], case preserved.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `kind` for splitting.
    pub fn with_kind(mut self, kind: TokenizerKind) -> Self {
        self.kind = kind;
        self
    }

    /// Lower-case the text before splitting.
    pub fn lowercase(mut self, lowercase: bool) -> Self {
        self.lowercase = lowercase;
        self
    }
}

impl Tokenizer for TokenizerConfig {
    fn tokenize(&self, text: &str) -> Result<Vec<String>> {
        if self.lowercase {
            self.kind.tokenize(&text.to_lowercase())
        } else {
            self.kind.tokenize(text)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharClass {
    Whitespace,
    Alphabetic,
    Numeric,
    Other,
}

impl CharClass {
    fn of(c: char) -> Self {
        if c.is_whitespace() {
            Self::Whitespace
        } else if c.is_alphabetic() {
            Self::Alphabetic
        } else if c.is_ascii_digit() {
            Self::Numeric
        } else {
            Self::Other
        }
    }
}

fn simple_tokens(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut start = 0;
    let mut state = CharClass::Whitespace;
    let mut prev = '\0';

    for (idx, c) in text.char_indices() {
        let class = CharClass::of(c);
        if state == CharClass::Whitespace {
            start = idx;
        } else if class != state || (class == CharClass::Other && c != prev) {
            tokens.push(text[start..idx].to_string());
            start = idx;
        }
        state = class;
        prev = c;
    }
    if state != CharClass::Whitespace {
        tokens.push(text[start..].to_string());
    }
    tokens
}

/// Tokenize both texts with `tokenizer` and compute their token-level distance.
pub fn levenshtein_text<Tk>(
    reference: &str,
    hypothesis: &str,
    tokenizer: &Tk,
) -> Result<Levenshtein<String>>
where
    Tk: Tokenizer + ?Sized,
{
    let reference = tokenizer.tokenize(reference)?;
    let hypothesis = tokenizer.tokenize(hypothesis)?;
    Ok(levenshtein(&reference, &hypothesis))
}

/// Token-level distance using the default ([`TokenizerKind::Simple`]) tokenizer.
pub fn levenshtein_str(reference: &str, hypothesis: &str) -> Levenshtein<String> {
    let kind = TokenizerKind::default();
    levenshtein(&kind.split(reference), &kind.split(hypothesis))
}
