// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::Node;
use std::collections::HashMap;

/// Represents an [OSM node](https://wiki.openstreetmap.org/wiki/Node) together with its tags.
#[derive(Debug, Clone, PartialEq)]
pub struct TaggedNode {
    pub node: Node,
    pub tags: HashMap<String, String>,
}

/// Represents an [OSM way](https://wiki.openstreetmap.org/wiki/Way).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Way {
    pub id: i64,
    pub nodes: Vec<i64>,
    pub tags: HashMap<String, String>,
}

/// Union over [OSM elements](https://wiki.openstreetmap.org/wiki/Elements) relevant
/// for building street networks and finding points of interest.
/// Relations are not represented.
#[derive(Debug, Clone, PartialEq)]
pub enum Feature {
    Node(TaggedNode),
    Way(Way),
}

impl Feature {
    pub fn tags_mut(&mut self) -> &mut HashMap<String, String> {
        match self {
            Self::Node(n) => &mut n.tags,
            Self::Way(w) => &mut w.tags,
        }
    }
}
