//! Placeholder ids for entries the server has not seen yet

use crate::error::{Error, Result};
use crate::models::EntryId;

/// Issues strictly decreasing negative ids (-1, -2, -3, ...) for one editing session.
///
/// Server ids are always positive, so a placeholder can never collide with one.
/// Once `i64::MIN` has been issued the allocator is exhausted and refuses
/// further ids rather than repeating one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityAllocator {
    next: Option<i64>,
}

impl IdentityAllocator {
    /// Allocator starting at -1.
    pub const fn new() -> Self {
        Self { next: Some(-1) }
    }

    /// Allocator whose first id is `start`, which must be negative.
    pub fn starting_at(start: i64) -> Result<Self> {
        if start >= 0 {
            return Err(Error::InvalidInput(format!(
                "placeholder ids must be negative, got {start}"
            )));
        }
        Ok(Self { next: Some(start) })
    }

    /// Hand out the next placeholder id.
    pub fn next_id(&mut self) -> Result<EntryId> {
        let next = self.next.ok_or_else(|| {
            Error::InvalidInput("placeholder ids for this session are exhausted".to_string())
        })?;
        self.next = next.checked_sub(1);
        Ok(EntryId::new(next))
    }

    /// The id the next call to [`Self::next_id`] will return, if any.
    pub fn peek(&self) -> Option<EntryId> {
        self.next.map(EntryId::new)
    }
}

impl Default for IdentityAllocator {
    fn default() -> Self {
        Self::new()
    }
}
