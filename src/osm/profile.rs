// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::HashMap;

/// Describes which OSM ways make up a specific street network,
/// and how they should be converted into a [Graph](crate::Graph).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Profile<'a> {
    /// Human readable name of the network type, e.g. "walk" or "drive".
    ///
    /// This value is not used for OSM data interpretation.
    pub name: &'a str,

    /// Key which must be present on an OSM way for it to be considered at all,
    /// customary "highway".
    pub required_key: &'a str,

    /// Tags which disqualify a way from being routable.
    ///
    /// A way is rejected if, for any [Exclusion], the value under [Exclusion::key]
    /// contains any of the [Exclusion::patterns] as a substring. For example,
    /// the "motor" pattern under "highway" rejects both "motorway" and "motorway_link".
    pub exclusions: &'a [Exclusion<'a>],

    /// Follow [oneway](https://wiki.openstreetmap.org/wiki/Key:oneway) and
    /// [junction=roundabout](https://wiki.openstreetmap.org/wiki/Tag:junction=roundabout) tags.
    /// If false, all ways are traversable in both directions.
    pub honor_oneway: bool,
}

/// Set of substrings which, when found in the value of an OSM tag, disqualify a way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Exclusion<'a> {
    pub key: &'a str,
    pub patterns: &'a [&'a str],
}

impl<'a> Exclusion<'a> {
    /// Returns true if the provided tags are rejected by this exclusion.
    /// Ways without [Exclusion::key] are never rejected.
    pub fn matches(&self, tags: &HashMap<String, String>) -> bool {
        tags.get(self.key)
            .map(|v| self.patterns.iter().any(|&p| v.contains(p)))
            .unwrap_or(false)
    }
}

impl<'a> Profile<'a> {
    /// Returns true if a way with the provided tags belongs to the network.
    pub fn is_routable(&self, tags: &HashMap<String, String>) -> bool {
        tags.contains_key(self.required_key) && !self.exclusions.iter().any(|e| e.matches(tags))
    }

    /// Returns a pair of booleans indicating whether the way with the provided tags can
    /// be traversed forward (along the nodes) and backward (against the nodes).
    pub fn way_direction(&self, tags: &HashMap<String, String>) -> (bool, bool) {
        if !self.honor_oneway {
            return (true, true);
        }

        match tags.get("oneway").map(|s| s.as_str()).unwrap_or("") {
            "yes" | "true" | "1" => return (true, false),
            "-1" | "reverse" => return (false, true),
            "no" | "false" | "0" => return (true, true),
            _ => {}
        }

        match tags.get("junction").map(|s| s.as_str()).unwrap_or("") {
            "roundabout" | "circular" => (true, false),
            _ => (true, true),
        }
    }
}

/// Pedestrian network: all streets and paths usable on foot, regardless of one-way restrictions.
pub const WALK_PROFILE: Profile<'static> = Profile {
    name: "walk",
    required_key: "highway",
    exclusions: &[
        Exclusion {
            key: "area",
            patterns: &["yes"],
        },
        Exclusion {
            key: "highway",
            patterns: &[
                "abandoned",
                "bus_guideway",
                "construction",
                "cycleway",
                "motor",
                "no",
                "planned",
                "platform",
                "proposed",
                "raceway",
                "razed",
            ],
        },
        Exclusion {
            key: "foot",
            patterns: &["no"],
        },
        Exclusion {
            key: "service",
            patterns: &["private"],
        },
        Exclusion {
            key: "access",
            patterns: &["private"],
        },
    ],
    honor_oneway: false,
};

/// Cycling network: streets and cycleways, excluding motorways, footways and steps.
pub const BIKE_PROFILE: Profile<'static> = Profile {
    name: "bike",
    required_key: "highway",
    exclusions: &[
        Exclusion {
            key: "area",
            patterns: &["yes"],
        },
        Exclusion {
            key: "highway",
            patterns: &[
                "abandoned",
                "bus_guideway",
                "construction",
                "corridor",
                "elevator",
                "escalator",
                "footway",
                "motor",
                "no",
                "planned",
                "platform",
                "proposed",
                "raceway",
                "razed",
                "steps",
            ],
        },
        Exclusion {
            key: "bicycle",
            patterns: &["no"],
        },
        Exclusion {
            key: "service",
            patterns: &["private"],
        },
        Exclusion {
            key: "access",
            patterns: &["private"],
        },
    ],
    honor_oneway: true,
};

/// Public drivable streets, excluding service roads.
pub const DRIVE_PROFILE: Profile<'static> = Profile {
    name: "drive",
    required_key: "highway",
    exclusions: &[
        Exclusion {
            key: "area",
            patterns: &["yes"],
        },
        Exclusion {
            key: "highway",
            patterns: &[
                "abandoned",
                "bridleway",
                "bus_guideway",
                "construction",
                "corridor",
                "cycleway",
                "elevator",
                "escalator",
                "footway",
                "no",
                "path",
                "pedestrian",
                "planned",
                "platform",
                "proposed",
                "raceway",
                "razed",
                "service",
                "steps",
                "track",
            ],
        },
        Exclusion {
            key: "motor_vehicle",
            patterns: &["no"],
        },
        Exclusion {
            key: "motorcar",
            patterns: &["no"],
        },
        Exclusion {
            key: "service",
            patterns: &[
                "alley",
                "driveway",
                "emergency_access",
                "parking",
                "parking_aisle",
                "private",
            ],
        },
        Exclusion {
            key: "access",
            patterns: &["private"],
        },
    ],
    honor_oneway: true,
};

impl<'a> Profile<'a> {
    /// Returns one of the predefined profiles by its [name](Profile::name).
    pub fn by_name(name: &str) -> Option<&'static Profile<'static>> {
        match name {
            "walk" => Some(&WALK_PROFILE),
            "bike" => Some(&BIKE_PROFILE),
            "drive" => Some(&DRIVE_PROFILE),
            _ => None,
        }
    }
}
