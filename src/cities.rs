//! City ranking and the table's sort-direction toggle.

use crate::models::CityRecord;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Column a city table can be ranked by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RankKey {
    /// Case-insensitive city name.
    Name,
    /// Value of the first listed population count.
    Population,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Ascending,
    Descending,
}

impl Direction {
    pub fn flipped(self) -> Self {
        match self {
            Direction::Ascending => Direction::Descending,
            Direction::Descending => Direction::Ascending,
        }
    }
}

/// Sort state owned by a city table view.
///
/// Selecting the current key again flips the direction; selecting another key
/// switches to it in ascending order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
    pub key: RankKey,
    pub direction: Direction,
}

impl Default for SortState {
    fn default() -> Self {
        Self {
            key: RankKey::Name,
            direction: Direction::Ascending,
        }
    }
}

impl SortState {
    pub fn select(&mut self, key: RankKey) {
        self.direction = if self.key == key {
            self.direction.flipped()
        } else {
            Direction::Ascending
        };
        self.key = key;
    }

    /// Direction shown on `key`'s column header, if it is the active column.
    pub fn direction_for(&self, key: RankKey) -> Option<Direction> {
        (self.key == key).then_some(self.direction)
    }
}

fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Return a new, ranked copy of `cities`.
pub fn rank_cities(cities: &[CityRecord], key: RankKey, direction: Direction) -> Vec<CityRecord> {
    let mut out = cities.to_vec();
    out.sort_by(|a, b| {
        let ord = match key {
            RankKey::Name => compare_names(&a.city_name, &b.city_name),
            RankKey::Population => a.latest_value().cmp(&b.latest_value()),
        };
        match direction {
            Direction::Ascending => ord,
            Direction::Descending => ord.reverse(),
        }
    });
    out
}
