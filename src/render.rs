//! Plain-text heatmap of a [`Levenshtein`] cost matrix.
//!
//! Rows are labelled with reference tokens, columns with hypothesis tokens, and cells
//! hold the border-free matrix from [`Levenshtein::matrix`]. With shading enabled each
//! cell is prefixed by a block glyph scaled against the largest cell, which gives a
//! rough colormap in a terminal.

use std::fmt;

use crate::levenshtein::Levenshtein;

const SHADES: [char; 5] = [' ', '░', '▒', '▓', '█'];

/// Display adapter that renders a result's matrix as a labelled table.
#[derive(Debug, Clone, Copy)]
pub struct Heatmap<'a, T> {
    result: &'a Levenshtein<T>,
    shading: bool,
}

impl<'a, T> Heatmap<'a, T> {
    /// Table without shading.
    pub fn new(result: &'a Levenshtein<T>) -> Self {
        Self {
            result,
            shading: false,
        }
    }

    /// Prefix each cell with a glyph scaled by its value.
    pub fn with_shading(mut self, shading: bool) -> Self {
        self.shading = shading;
        self
    }

    fn cell(&self, value: usize, max: usize) -> String {
        if !self.shading {
            return value.to_string();
        }
        let shade = if max == 0 {
            SHADES[0]
        } else {
            SHADES[value * (SHADES.len() - 1) / max]
        };
        format!("{shade}{value}")
    }
}

fn labels<T: fmt::Display>(tokens: &[T]) -> Vec<String> {
    tokens.iter().map(ToString::to_string).collect()
}

fn width(s: &str) -> usize {
    s.chars().count()
}

impl<T: fmt::Display> fmt::Display for Heatmap<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let matrix = self.result.matrix();
        let (m, n) = matrix.dim();
        let max = matrix.iter().copied().max().unwrap_or(0);

        let row_labels: Vec<String> = labels(self.result.reference());
        let col_labels: Vec<String> = labels(self.result.hypothesis());
        let cells: Vec<Vec<String>> = (0..m)
            .map(|i| (0..n).map(|j| self.cell(matrix[[i, j]], max)).collect())
            .collect();

        let label_width = row_labels.iter().map(|l| width(l)).max().unwrap_or(0);
        let col_widths: Vec<usize> = col_labels
            .iter()
            .enumerate()
            .map(|(j, label)| {
                cells
                    .iter()
                    .map(|row| width(&row[j]))
                    .fold(width(label), usize::max)
            })
            .collect();

        // Lines are assembled first so padding never leaves trailing whitespace.
        let mut header = " ".repeat(label_width);
        for (label, &w) in col_labels.iter().zip(&col_widths) {
            header.push_str(&format!("  {label:>w$}"));
        }
        writeln!(f, "{}", header.trim_end())?;

        for (label, row) in row_labels.iter().zip(&cells) {
            let mut line = format!("{label:<label_width$}");
            for (cell, &w) in row.iter().zip(&col_widths) {
                line.push_str(&format!("  {cell:>w$}"));
            }
            writeln!(f, "{}", line.trim_end())?;
        }
        Ok(())
    }
}
