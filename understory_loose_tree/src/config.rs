// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tuning parameters for [`LooseTree`](crate::LooseTree).

use crate::error::{LooseError, Result};

/// Tuning parameters shared by every region of a tree.
///
/// The defaults match a typical 2D scene: a quadtree (`2 × 2` split) with
/// a quarter-cell padding, one entry per region before splitting, and at
/// most eight levels below the root.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LooseConfig {
    /// Fraction of a region's width/height added on every side to form its loose box.
    pub padding: f64,
    /// Number of entries a region keeps in its `CanDescend` bucket before it
    /// starts pushing new entries into children.
    pub max_objects: usize,
    /// Maximum number of levels below the root.
    pub max_depth: u32,
    /// Child columns per split.
    pub cols: u32,
    /// Child rows per split.
    pub rows: u32,
}

impl Default for LooseConfig {
    fn default() -> Self {
        Self {
            padding: 0.25,
            max_objects: 1,
            max_depth: 8,
            cols: 2,
            rows: 2,
        }
    }
}

impl LooseConfig {
    /// Check the parameters, returning [`LooseError::InvalidConfig`] on the first problem.
    pub fn validate(&self) -> Result<()> {
        if self.cols == 0 || self.rows == 0 {
            return Err(LooseError::InvalidConfig("cols and rows must be at least 1"));
        }
        if !self.padding.is_finite() || self.padding < 0.0 {
            return Err(LooseError::InvalidConfig(
                "padding must be finite and non-negative",
            ));
        }
        Ok(())
    }

    /// Number of children produced by one split.
    pub fn fan_out(&self) -> usize {
        self.cols as usize * self.rows as usize
    }
}
