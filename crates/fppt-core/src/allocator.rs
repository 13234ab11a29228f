//! Instance index and offset allocation.
//!
//! One allocator lives for a whole run. Indices are counted per definition,
//! offsets are shared by every invocation regardless of where in the include
//! tree it was found.

use std::collections::HashMap;

use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub struct InstanceAllocator {
    counts: HashMap<String, u64>,
    offset: i64,
    step: i64,
    // Set once `offset + step` left the i64 range.
    overflowed: bool,
}

impl InstanceAllocator {
    pub fn new(start_offset: i64, step: i64) -> Self {
        Self {
            counts: HashMap::new(),
            offset: start_offset,
            step,
            overflowed: false,
        }
    }

    /// Claim the next instance index for `definition`: 0 on first use, then 1, 2, ...
    pub fn next_index(&mut self, definition: &str) -> u64 {
        match self.counts.get_mut(definition) {
            Some(count) => {
                *count += 1;
                *count
            }
            None => {
                self.counts.insert(definition.to_string(), 0);
                0
            }
        }
    }

    /// The offset handed to the next rendered invocation.
    ///
    /// Fails with [`Error::OffsetOverflow`] once advancing has run past the
    /// `i64` range.
    pub fn offset(&self) -> Result<i64> {
        if self.overflowed {
            return Err(Error::OffsetOverflow {
                offset: self.offset,
                step: self.step,
            });
        }
        Ok(self.offset)
    }

    pub fn step(&self) -> i64 {
        self.step
    }

    /// Move past the current offset slot. Called once per successful render.
    pub fn advance(&mut self) {
        if self.overflowed {
            return;
        }
        match self.offset.checked_add(self.step) {
            Some(next) => self.offset = next,
            None => self.overflowed = true,
        }
    }

    /// Highest index handed out for `definition`, if any.
    pub fn instance_count(&self, definition: &str) -> Option<u64> {
        self.counts.get(definition).copied()
    }
}
