use crate::prelude::Real;
use getset::CopyGetters;
use std::collections::VecDeque;

/// Arithmetic mean over the most recent observations of a stream.
///
/// Keeps at most `window` values. When fewer values were observed, the mean
/// is taken over all of them.
#[derive(Debug, Clone, PartialEq, CopyGetters)]
pub struct TrailingMean {
    #[getset(get_copy = "pub")]
    window: usize,
    buffer: VecDeque<Real>,
}

impl TrailingMean {
    /// Create a new tracker. Return None for an empty window.
    pub fn new(window: usize) -> Option<TrailingMean> {
        if window == 0 {
            return None;
        }
        Some(TrailingMean {
            window,
            buffer: VecDeque::with_capacity(window),
        })
    }

    /// Add single observation of value x
    pub fn add(&mut self, x: Real) {
        if self.buffer.len() == self.window {
            self.buffer.pop_front();
        }
        self.buffer.push_back(x);
    }

    /// Number of values currently inside the window.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Mean of the values inside the window, None if nothing was observed.
    pub fn mean(&self) -> Option<Real> {
        if self.buffer.is_empty() {
            return None;
        }
        let tot: Real = self.buffer.iter().sum();
        Some(tot / self.buffer.len() as Real)
    }
}

impl Extend<Real> for TrailingMean {
    fn extend<I: IntoIterator<Item = Real>>(&mut self, iter: I) {
        for x in iter {
            self.add(x);
        }
    }
}
