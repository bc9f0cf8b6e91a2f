//! Rank of a business at one grid point.
//!
//! Stored data overloads `999` to mean "not present in the results at this
//! point". Inside the workspace that case is `Rank::NotFound`; the integer
//! only reappears when a rank is serialized for the web consumer.

use std::cmp::Ordering;

use serde::{Serialize, Serializer};

/// Wire value for a rank that was not observed.
pub const SENTINEL_RANK: i32 = 999;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rank {
    /// 1-based position in the local results (1 = top).
    Found(u32),
    NotFound,
}

impl Rank {
    /// Convert a stored `rank_position`.
    ///
    /// Only `1..SENTINEL_RANK` are real positions; the sentinel itself, zero and
    /// negative values all mean the business was not observed.
    #[must_use]
    pub fn from_stored(raw: i32) -> Self {
        if raw > 0 && raw < SENTINEL_RANK {
            u32::try_from(raw).map_or(Rank::NotFound, Rank::Found)
        } else {
            Rank::NotFound
        }
    }

    #[must_use]
    pub fn position(self) -> Option<u32> {
        match self {
            Rank::Found(n) => Some(n),
            Rank::NotFound => None,
        }
    }

    #[must_use]
    pub fn is_found(self) -> bool {
        matches!(self, Rank::Found(_))
    }

    /// Integer form used in API payloads.
    #[must_use]
    pub fn to_wire(self) -> i32 {
        match self {
            Rank::Found(n) => i32::try_from(n).unwrap_or(SENTINEL_RANK),
            Rank::NotFound => SENTINEL_RANK,
        }
    }

    /// The better (lower) of two ranks.
    #[must_use]
    pub fn best(self, other: Rank) -> Rank {
        std::cmp::min(self, other)
    }
}

impl Ord for Rank {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Rank::Found(a), Rank::Found(b)) => a.cmp(b),
            (Rank::Found(_), Rank::NotFound) => Ordering::Less,
            (Rank::NotFound, Rank::Found(_)) => Ordering::Greater,
            (Rank::NotFound, Rank::NotFound) => Ordering::Equal,
        }
    }
}

impl PartialOrd for Rank {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Serialize for Rank {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i32(self.to_wire())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_positions_become_found() {
        assert_eq!(Rank::from_stored(1), Rank::Found(1));
        assert_eq!(Rank::from_stored(998), Rank::Found(998));
    }

    #[test]
    fn sentinel_and_non_positive_values_are_not_found() {
        assert_eq!(Rank::from_stored(SENTINEL_RANK), Rank::NotFound);
        assert_eq!(Rank::from_stored(1_500), Rank::NotFound);
        assert_eq!(Rank::from_stored(0), Rank::NotFound);
        assert_eq!(Rank::from_stored(-3), Rank::NotFound);
    }

    #[test]
    fn found_orders_before_not_found() {
        let mut ranks = vec![Rank::NotFound, Rank::Found(7), Rank::Found(2)];
        ranks.sort();
        assert_eq!(ranks, vec![Rank::Found(2), Rank::Found(7), Rank::NotFound]);
        assert_eq!(Rank::Found(4).best(Rank::NotFound), Rank::Found(4));
        assert_eq!(Rank::Found(4).best(Rank::Found(3)), Rank::Found(3));
    }

    #[test]
    fn serializes_as_integer_with_sentinel() {
        let json = serde_json::to_string(&vec![Rank::Found(3), Rank::NotFound]).expect("json");
        assert_eq!(json, "[3,999]");
    }
}
