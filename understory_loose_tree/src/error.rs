// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error type shared by all fallible tree operations.

use thiserror::Error;

use crate::tree::Key;
use crate::types::Aabb2D;

/// Errors reported by [`LooseTree`](crate::LooseTree).
///
/// Every error leaves the tree untouched; callers can keep using it.
#[derive(Copy, Clone, Debug, PartialEq, Error)]
pub enum LooseError {
    /// A rectangle had a non-finite coordinate or no area.
    #[error("invalid rectangle {0:?}: coordinates must be finite with min < max")]
    InvalidRectangle(Aabb2D<f64>),

    /// The key does not refer to a live entry (removed already, or never issued by this tree).
    #[error("entry {0:?} was already removed")]
    HandleAlreadyRemoved(Key),

    /// Construction parameters were rejected.
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),

    /// Every one of the `u32::MAX` entry slots is live or retired.
    #[error("no entry slots left")]
    SlotsExhausted,
}

/// Shorthand for results carrying a [`LooseError`].
pub type Result<T> = core::result::Result<T, LooseError>;

impl LooseError {
    pub(crate) fn check_rect(rect: Aabb2D<f64>) -> Result<Aabb2D<f64>> {
        if rect.is_finite() && !rect.is_empty() {
            Ok(rect)
        } else {
            Err(Self::InvalidRectangle(rect))
        }
    }

    pub(crate) fn stale(key: Key) -> Self {
        Self::HandleAlreadyRemoved(key)
    }
}
