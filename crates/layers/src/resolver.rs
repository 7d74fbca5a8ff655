//! Point-in-country resolution.
//!
//! The cursor rarely jumps between countries from one sample to the next, so
//! the previously matched country is tested first. On a miss the whole index
//! is scanned in atlas order and the first containing country wins; the
//! shortcut never changes the answer for non-overlapping boundaries.

use foundation::math::GeoCoordinate;

use crate::countries::{CountryId, CountryIndex};

/// Country containing `p`, testing `previous` before a full scan.
pub fn resolve(
    index: &CountryIndex,
    p: GeoCoordinate,
    previous: Option<CountryId>,
) -> Option<CountryId> {
    if let Some(prev) = previous
        && index.feature(prev).is_some_and(|f| f.contains(p))
    {
        return Some(prev);
    }
    resolve_scan(index, p)
}

/// First country in atlas order containing `p`.
pub fn resolve_scan(index: &CountryIndex, p: GeoCoordinate) -> Option<CountryId> {
    index
        .iter()
        .find(|(_, feature)| feature.contains(p))
        .map(|(id, _)| id)
}

/// Outcome of one resolver step.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Still inside the previously selected country.
    Unchanged(CountryId),
    /// Moved into a different country.
    Entered(CountryId),
    /// Not over any country (ocean, or off the globe).
    None,
}

impl Resolution {
    pub fn country(self) -> Option<CountryId> {
        match self {
            Resolution::Unchanged(id) | Resolution::Entered(id) => Some(id),
            Resolution::None => None,
        }
    }
}

/// Resolver that remembers its last match.
#[derive(Debug, Clone, Default)]
pub struct CountryResolver {
    previous: Option<CountryId>,
}

impl CountryResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolve(&mut self, index: &CountryIndex, p: GeoCoordinate) -> Resolution {
        if let Some(prev) = self.previous
            && index.feature(prev).is_some_and(|f| f.contains(p))
        {
            return Resolution::Unchanged(prev);
        }
        self.previous = resolve_scan(index, p);
        match self.previous {
            Some(id) => Resolution::Entered(id),
            None => Resolution::None,
        }
    }

    pub fn clear(&mut self) {
        self.previous = None;
    }
}
