//! Token-level edit distance for scoring text against a reference.
//!
//! The core is [`levenshtein()`]: given two token sequences it returns the distance, the
//! substitution/insertion/deletion/correct counters along one optimal alignment, and the
//! full dynamic-programming table. Tokenization and presentation live at the edges:
//! - [`tokenize`] turns strings into tokens ([`Tokenizer`] trait, built-in splitters),
//! - [`render`] prints a result's matrix as a labelled table.
//!
//! Public invariants (must not change):
//! - Unit costs only; `counters.substitutions + counters.insertions + counters.deletions == distance`.
//! - Reference tokens index rows, hypothesis tokens index columns: reference-only tokens are
//!   deletions, hypothesis-only tokens are insertions.
//! - Ties on the backtrace resolve diagonal, then deletion, then insertion.
//! - Every call is pure and allocates its own table; nothing is cached.
//!
//! ```
//! use tokedit::{levenshtein, Counters};
//!
//! let res = levenshtein(&["a", "b", "c"], &["a", "x", "c"]);
//! assert_eq!(res.distance(), 1);
//! assert_eq!(
//!     res.counters(),
//!     Counters { substitutions: 1, insertions: 0, deletions: 0, correct: 2 }
//! );
//! assert_eq!(res.matrix().dim(), (3, 3));
//! ```

pub mod levenshtein;
pub mod render;
pub mod tokenize;

pub use levenshtein::{levenshtein, Counters, Levenshtein, Operation, Step};
pub use render::Heatmap;
pub use tokenize::{levenshtein_str, levenshtein_text, Tokenizer, TokenizerConfig, TokenizerKind};
