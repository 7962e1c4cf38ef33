// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use super::{model, FeatureSink, PoiOptions};
use crate::{Bounds, Error, Position};

/// Selects OSM features by a tag, e.g. `leisure=park,nature_reserve`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagFilter {
    pub key: String,

    /// Accepted values of the tag. An empty list accepts any value.
    pub values: Vec<String>,
}

impl TagFilter {
    pub fn new<K: Into<String>>(key: K, values: &[&str]) -> Self {
        Self {
            key: key.into(),
            values: values.iter().map(|v| v.to_string()).collect(),
        }
    }

    pub fn matches(&self, tags: &HashMap<String, String>) -> bool {
        match tags.get(&self.key) {
            Some(value) => self.values.is_empty() || self.values.iter().any(|v| v == value),
            None => false,
        }
    }
}

impl fmt::Display for TagFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.values.is_empty() {
            write!(f, "{}", self.key)
        } else {
            write!(f, "{}={}", self.key, self.values.join(","))
        }
    }
}

impl FromStr for TagFilter {
    type Err = Error;

    /// Parses `key` (any value) or `key=value1,value2`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (key, values) = match s.split_once('=') {
            Some((key, values)) => (key.trim(), values.split(',').map(str::trim).collect::<Vec<_>>()),
            None => (s.trim(), Vec::new()),
        };

        if key.is_empty() || values.iter().any(|v| v.is_empty()) {
            return Err(Error::InvalidTagFilter(s.to_string()));
        }

        Ok(Self::new(key, &values))
    }
}

/// Collects positions of nodes and ways matching any of the tag filters.
pub(super) struct PoiCollector<'a> {
    filters: &'a [TagFilter],
    bbox: Option<Bounds>,

    /// Positions of all nodes seen so far, as ways only reference node ids.
    positions: HashMap<i64, Position>,

    points: Vec<Position>,
    outside_bbox: usize,
    incomplete_ways: usize,
}

impl<'a> PoiCollector<'a> {
    pub(super) fn new(options: &PoiOptions<'a>) -> Self {
        Self {
            filters: options.filters,
            bbox: options.bbox,
            positions: HashMap::default(),
            points: Vec::default(),
            outside_bbox: 0,
            incomplete_ways: 0,
        }
    }

    pub(super) fn into_points(self) -> Vec<Position> {
        self.points
    }

    fn is_wanted(&self, tags: &HashMap<String, String>) -> bool {
        self.filters.iter().any(|f| f.matches(tags))
    }

    fn add_point(&mut self, p: Position) {
        if self.bbox.is_some_and(|bbox| !bbox.contains(p)) {
            self.outside_bbox += 1;
        } else {
            self.points.push(p);
        }
    }

    /// Mean position of all distinct known nodes of a way.
    /// Closed ways repeat their first node, which must not be counted twice.
    fn centroid(&self, w: &model::Way) -> Option<Position> {
        let mut seen = HashSet::with_capacity(w.nodes.len());
        let (count, lat_sum, lon_sum) = w
            .nodes
            .iter()
            .filter(|&&id| seen.insert(id))
            .filter_map(|id| self.positions.get(id))
            .fold((0usize, 0.0, 0.0), |(count, lat_sum, lon_sum), p| {
                (count + 1, lat_sum + p.lat, lon_sum + p.lon)
            });

        if count == 0 {
            None
        } else {
            let n = count as f64;
            Some(Position::new(lat_sum / n, lon_sum / n))
        }
    }
}

impl FeatureSink for PoiCollector<'_> {
    fn add_feature(&mut self, f: model::Feature) {
        match f {
            model::Feature::Node(n) => {
                let p = n.node.position();
                self.positions.insert(n.node.id, p);
                if self.is_wanted(&n.tags) {
                    self.add_point(p);
                }
            }

            model::Feature::Way(w) => {
                if !self.is_wanted(&w.tags) {
                    return;
                }

                match self.centroid(&w) {
                    Some(p) => self.add_point(p),
                    None => {
                        log::debug!("way {} has no known nodes", w.id);
                        self.incomplete_ways += 1;
                    }
                }
            }
        }
    }

    fn finish(&mut self) {
        log::info!(
            "found {} points of interest; skipped {} outside of the bbox and {} ways without nodes",
            self.points.len(),
            self.outside_bbox,
            self.incomplete_ways,
        );
        self.positions.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! tags {
        {} => { HashMap::default() };
        {$( $k:literal : $v:literal ),+} => {
            HashMap::from_iter([ $( ($k.to_string(), $v.to_string()) ),+ ])
        };
    }

    #[test]
    fn parse_tag_filter() {
        assert_eq!(
            "leisure=park, nature_reserve".parse::<TagFilter>().unwrap(),
            TagFilter::new("leisure", &["park", "nature_reserve"])
        );
        assert_eq!("amenity".parse::<TagFilter>().unwrap(), TagFilter::new("amenity", &[]));
        assert!("=park".parse::<TagFilter>().is_err());
        assert!("leisure=".parse::<TagFilter>().is_err());
        assert!("leisure=park,,garden".parse::<TagFilter>().is_err());

        assert_eq!(TagFilter::new("leisure", &["park", "garden"]).to_string(), "leisure=park,garden");
        assert_eq!(TagFilter::new("amenity", &[]).to_string(), "amenity");
    }

    #[test]
    fn tag_filter_matches() {
        let parks = TagFilter::new("leisure", &["park", "nature_reserve"]);
        assert!(parks.matches(&tags! {"leisure": "park", "name": "Markeaton Park"}));
        assert!(parks.matches(&tags! {"leisure": "nature_reserve"}));
        assert!(!parks.matches(&tags! {"leisure": "pitch"}));
        assert!(!parks.matches(&tags! {}));

        let any_amenity = TagFilter::new("amenity", &[]);
        assert!(any_amenity.matches(&tags! {"amenity": "cafe"}));
        assert!(!any_amenity.matches(&tags! {"shop": "bakery"}));
    }
}
