//! Bidirectional zone-id/position indexes.
//!
//! A zone index maps the opaque identifier of a zone to its dense
//! integer position in a backing sample store, and back. Indexes are
//! built once at coverage construction and never mutated afterwards.

use crate::ZonalError;
use dggrs::ZoneId;
use std::collections::HashMap;

/// Materialized index over an explicit ordered zone list.
#[derive(Debug, Clone)]
pub struct ZoneList {
    zones: Vec<ZoneId>,
    positions: HashMap<ZoneId, usize>,
}

impl ZoneList {
    /// Builds the index from an ordered zone sequence.
    ///
    /// Fails on duplicate identifiers, which would make positions
    /// ambiguous.
    pub fn new(zones: Vec<ZoneId>) -> Result<Self, ZonalError> {
        let mut positions = HashMap::with_capacity(zones.len());
        for (position, &zone) in zones.iter().enumerate() {
            if positions.insert(zone, position).is_some() {
                return Err(ZonalError::DuplicateZone(zone));
            }
        }
        Ok(Self { zones, positions })
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    pub fn position_of(&self, zone: ZoneId) -> Option<usize> {
        self.positions.get(&zone).copied()
    }

    pub fn zone_at(&self, position: usize) -> Result<ZoneId, ZonalError> {
        self.zones
            .get(position)
            .copied()
            .ok_or_else(|| ZonalError::Position {
                position,
                len: self.zones.len(),
            })
    }
}

/// Computed index over a regular arithmetic progression of
/// identifiers, `start + i*step`, without materializing the list.
///
/// `decode` turns a progression value into a zone identifier. It may
/// validate or wrap the value but must preserve it as the identifier's
/// raw form; [`position_of`](Self::position_of) inverts the arithmetic
/// on the raw value and verifies the result, so a decode that remaps
/// bits reports its zones as absent rather than misplacing them.
#[derive(Debug, Clone, Copy)]
pub struct ZoneRange {
    start: i64,
    step: i64,
    count: usize,
    decode: fn(i64) -> ZoneId,
}

#[allow(clippy::cast_sign_loss)]
fn raw_decode(value: i64) -> ZoneId {
    ZoneId::from_raw(value as u64)
}

impl ZoneRange {
    pub fn new(start: i64, step: i64, count: usize) -> Result<Self, ZonalError> {
        Self::with_decode(start, step, count, raw_decode)
    }

    pub fn with_decode(
        start: i64,
        step: i64,
        count: usize,
        decode: fn(i64) -> ZoneId,
    ) -> Result<Self, ZonalError> {
        if step == 0 {
            return Err(ZonalError::ZeroStep);
        }
        Ok(Self {
            start,
            step,
            count,
            decode,
        })
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn get(&self, position: usize) -> Option<ZoneId> {
        (position < self.count).then(|| self.value(position))
    }

    pub fn position_of(&self, zone: ZoneId) -> Option<usize> {
        #[allow(clippy::cast_possible_wrap)]
        let raw = zone.into_raw() as i64;
        let delta = i128::from(raw) - i128::from(self.start);
        let step = i128::from(self.step);
        if delta % step != 0 {
            return None;
        }
        let position = delta / step;
        if position < 0 || position >= self.count as i128 {
            return None;
        }
        #[allow(clippy::cast_possible_truncation)]
        let position = position as usize;
        (self.value(position) == zone).then_some(position)
    }

    /// Returns the sub-range `[from, to)` as another computed index.
    ///
    /// Slicing is O(1) and allocates nothing.
    pub fn slice(&self, from: usize, to: usize) -> Result<Self, ZonalError> {
        if from > to || to > self.count {
            return Err(ZonalError::Slice {
                from,
                to,
                len: self.count,
            });
        }
        #[allow(clippy::cast_possible_wrap)]
        let start = self.start + self.step * from as i64;
        Ok(Self {
            start,
            step: self.step,
            count: to - from,
            decode: self.decode,
        })
    }

    #[allow(clippy::cast_possible_wrap)]
    fn value(&self, position: usize) -> ZoneId {
        (self.decode)(self.start + self.step * position as i64)
    }
}

/// A zone index of either realization.
#[derive(Debug, Clone)]
pub enum ZoneIndex {
    List(ZoneList),
    Range(ZoneRange),
}

impl ZoneIndex {
    pub fn len(&self) -> usize {
        match self {
            Self::List(list) => list.len(),
            Self::Range(range) => range.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn position_of(&self, zone: ZoneId) -> Option<usize> {
        match self {
            Self::List(list) => list.position_of(zone),
            Self::Range(range) => range.position_of(zone),
        }
    }

    pub fn zone_at(&self, position: usize) -> Result<ZoneId, ZonalError> {
        match self {
            Self::List(list) => list.zone_at(position),
            Self::Range(range) => range.get(position).ok_or_else(|| ZonalError::Position {
                position,
                len: range.len(),
            }),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = ZoneId> + '_ {
        (0..self.len()).filter_map(move |position| self.zone_at(position).ok())
    }
}

impl From<ZoneList> for ZoneIndex {
    fn from(list: ZoneList) -> Self {
        Self::List(list)
    }
}

impl From<ZoneRange> for ZoneIndex {
    fn from(range: ZoneRange) -> Self {
        Self::Range(range)
    }
}
