// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! Conversion of matching results into [GeoJSON](https://geojson.org/) feature collections,
//! ready for plotting on a map.
//!
//! All coordinates are written in WGS84, as `[lon, lat]` pairs.

use ::geojson::{Feature, FeatureCollection, Geometry, JsonObject, JsonValue, Value};

use crate::{Assignment, Graph, Position, Route, Selection};

fn coordinates(p: Position) -> Vec<f64> {
    vec![p.lon, p.lat]
}

fn feature<I: IntoIterator<Item = (&'static str, JsonValue)>>(geometry: Value, properties: I) -> Feature {
    Feature {
        bbox: None,
        geometry: Some(Geometry::new(geometry)),
        id: None,
        properties: Some(
            properties
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect::<JsonObject>(),
        ),
        foreign_members: None,
    }
}

fn line_string<I: IntoIterator<Item = Position>>(positions: I) -> Value {
    Value::LineString(positions.into_iter().map(coordinates).collect())
}

fn collection(features: Vec<Feature>) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

/// Positions of the route's nodes. Nodes missing from the graph are skipped.
fn route_positions<'a>(g: &'a Graph, route: &'a Route) -> impl Iterator<Item = Position> + 'a {
    route
        .nodes
        .iter()
        .filter_map(|&id| g.get_node(id))
        .map(|n| n.position())
}

/// Builds a collection of Points, each with an `index` and a `role` property
/// (e.g. `"source"` or `"destination"`).
pub fn points_collection(positions: &[Position], role: &str) -> FeatureCollection {
    collection(
        positions
            .iter()
            .enumerate()
            .map(|(index, &p)| {
                feature(
                    Value::Point(coordinates(p)),
                    [("index", index.into()), ("role", role.into())],
                )
            })
            .collect(),
    )
}

/// Builds straight connections between sources and their assigned destinations.
/// Assignments referring to out-of-range indices are skipped.
pub fn connections_collection(
    sources: &[Position],
    destinations: &[Position],
    assignments: &[Assignment],
) -> FeatureCollection {
    collection(
        assignments
            .iter()
            .filter_map(|a| {
                let from = *sources.get(a.source)?;
                let to = *destinations.get(a.destination)?;
                Some(feature(
                    line_string([from, to]),
                    [
                        ("source", a.source.into()),
                        ("destination", a.destination.into()),
                        ("distance", a.distance.into()),
                    ],
                ))
            })
            .collect(),
    )
}

/// Builds the routes of an explorer [Selection]: one LineString per route
/// (annotated with its `label`), followed by the origin Point.
pub fn routes_collection(g: &Graph, selection: &Selection) -> FeatureCollection {
    let mut features: Vec<Feature> = selection
        .routes
        .iter()
        .map(|route| {
            feature(
                line_string(route_positions(g, route)),
                [
                    ("destination", route.destination.into()),
                    ("distance", route.distance.into()),
                    ("label", route.label().into()),
                ],
            )
        })
        .collect();

    features.push(feature(
        Value::Point(coordinates(selection.origin.position())),
        [("role", "origin".into()), ("node", selection.origin.id.into())],
    ));

    collection(features)
}

/// Builds network connections of every source: the straight hop from the source
/// to its snapped node, the route over the graph and the hop to the destination.
/// Sources without a route are skipped.
pub fn network_routes_collection(
    g: &Graph,
    sources: &[Position],
    destinations: &[Position],
    routes: &[Option<Route>],
) -> FeatureCollection {
    collection(
        routes
            .iter()
            .enumerate()
            .filter_map(|(source, route)| {
                let route = route.as_ref()?;
                let from = *sources.get(source)?;
                let to = *destinations.get(route.destination)?;
                let positions = std::iter::once(from)
                    .chain(route_positions(g, route))
                    .chain(std::iter::once(to));
                Some(feature(
                    line_string(positions),
                    [
                        ("source", source.into()),
                        ("destination", route.destination.into()),
                        ("distance", route.distance.into()),
                    ],
                ))
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::nearest::test_fixtures::{at, grid, id};
    use crate::Node;

    fn to_json(fc: FeatureCollection) -> JsonValue {
        serde_json::to_value(fc).unwrap()
    }

    #[test]
    fn points() {
        let fc = to_json(points_collection(
            &[Position::new(52.9, -1.48), Position::new(52.91, -1.47)],
            "source",
        ));
        assert_eq!(fc["type"], "FeatureCollection");
        assert_eq!(fc["features"].as_array().unwrap().len(), 2);
        assert_eq!(fc["features"][1]["geometry"]["coordinates"], json!([-1.47, 52.91]));
        assert_eq!(fc["features"][1]["properties"]["index"], 1);
        assert_eq!(fc["features"][1]["properties"]["role"], "source");
    }

    #[test]
    fn connections() {
        let sources = [Position::new(52.9, -1.48), Position::new(52.91, -1.47)];
        let destinations = [Position::new(52.95, -1.40)];
        let assignments = [
            Assignment { source: 1, destination: 0, distance: 8000.0 },
            Assignment { source: 5, destination: 0, distance: 1.0 },
        ];

        let fc = to_json(connections_collection(&sources, &destinations, &assignments));
        let features = fc["features"].as_array().unwrap();
        assert_eq!(features.len(), 1);
        assert_eq!(features[0]["geometry"]["type"], "LineString");
        assert_eq!(
            features[0]["geometry"]["coordinates"],
            json!([[-1.47, 52.91], [-1.40, 52.95]])
        );
        assert_eq!(features[0]["properties"]["distance"], 8000.0);
    }

    #[test]
    fn routes() {
        let g = grid(2);
        let selection = Selection {
            origin: Node { id: id(0, 0), lat: 52.9, lon: -1.48 },
            routes: vec![Route {
                destination: 0,
                distance: 178.4,
                nodes: vec![id(0, 0), id(0, 1), id(1, 1)],
            }],
        };

        let fc = routes_collection(&g, &selection);
        assert_eq!(fc.features.len(), 2);
        let fc = to_json(fc);
        let features = fc["features"].as_array().unwrap();
        assert_eq!(features.len(), 2);
        assert_eq!(features[0]["geometry"]["coordinates"].as_array().unwrap().len(), 3);
        assert_eq!(features[0]["properties"]["label"], "178 m");
        assert_eq!(features[1]["geometry"]["type"], "Point");
        assert_eq!(features[1]["properties"]["node"], id(0, 0));
    }

    #[test]
    fn network_routes() {
        let g = grid(2);
        let sources = [at(&g, 0, 0), at(&g, 1, 1)];
        let destinations = [at(&g, 1, 0)];
        let routes = vec![
            Some(Route {
                destination: 0,
                distance: 111.0,
                nodes: vec![id(0, 0), id(1, 0)],
            }),
            None,
        ];

        let fc = to_json(network_routes_collection(&g, &sources, &destinations, &routes));
        let features = fc["features"].as_array().unwrap();
        assert_eq!(features.len(), 1);
        assert_eq!(features[0]["properties"]["source"], 0);
        assert_eq!(features[0]["geometry"]["coordinates"].as_array().unwrap().len(), 4);
    }
}
