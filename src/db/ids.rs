//! Primary key allocation.

use chrono::{DateTime, TimeZone, Utc};
use parking_lot::Mutex;

/// A freshly allocated identity: the key and the creation instant it
/// encodes.
#[derive(Debug, Clone)]
pub struct NewId {
  pub id: String,
  pub created_at: DateTime<Utc>,
}

/// Allocates creation-ordered string keys from the wall clock. A monotonic
/// (millisecond, sequence) pair behind a lock keeps keys unique even when
/// several creates land in the same clock tick, and lexicographic order on
/// the produced strings equals allocation order. Keys are opaque to
/// callers.
#[derive(Debug, Default)]
pub struct IdAllocator {
  state: Mutex<(i64, u16)>,
}

impl IdAllocator {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn allocate(&self) -> NewId {
    let mut state = self.state.lock();
    let now = Utc::now().timestamp_millis();
    let (last_millis, last_seq) = *state;
    let (millis, seq) = if now > last_millis {
      (now, 0)
    } else if last_seq < 9999 {
      (last_millis, last_seq + 1)
    } else {
      // Sequence space for this tick is exhausted; borrow the next one.
      (last_millis + 1, 0)
    };
    *state = (millis, seq);

    NewId {
      id: format!("{:013}{:04}", millis, seq),
      created_at: Utc
        .timestamp_millis_opt(millis)
        .single()
        .unwrap_or_else(Utc::now),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashSet;

  #[test]
  fn sequential_ids_are_unique_and_ordered() {
    let allocator = IdAllocator::new();
    let mut seen = HashSet::new();
    let mut previous = String::new();
    for _ in 0..10_000 {
      let new_id = allocator.allocate();
      assert!(new_id.id > previous, "ids must sort by allocation order");
      assert!(seen.insert(new_id.id.clone()));
      previous = new_id.id;
    }
  }

  #[test]
  fn created_at_matches_id_tick() {
    let allocator = IdAllocator::new();
    let new_id = allocator.allocate();
    let encoded: i64 = new_id.id[..13].parse().unwrap();
    assert_eq!(encoded, new_id.created_at.timestamp_millis());
  }
}
