// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::fmt;
use std::str::FromStr;
use std::sync::{Mutex, PoisonError};

use proj::Proj;

use crate::{Error, Position};

/// Coordinate reference system used to turn WGS84 [Positions](Position)
/// into planar coordinates, where euclidean distances make sense.
///
/// Planar coordinates are always `[x, y]` (`[easting, northing]`);
/// for [Crs::Wgs84] that is `[lon, lat]`. Conversions are done by
/// a [Projection], see [Crs::projection].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Crs {
    /// Geographic coordinates, [EPSG:4326](https://epsg.io/4326). Projection is an identity.
    Wgs84,

    /// Spherical ("web") mercator, [EPSG:3857](https://epsg.io/3857).
    ///
    /// Distances are inflated by `1 / cos(lat)`, which is negligible only when
    /// comparing distances within a small area.
    WebMercator,

    /// [Universal Transverse Mercator](https://en.wikipedia.org/wiki/Universal_Transverse_Mercator_coordinate_system)
    /// over the WGS84 ellipsoid, EPSG:326zz (north) or EPSG:327zz (south).
    Utm { zone: u8, north: bool },
}

impl Crs {
    /// Returns the UTM zone containing the given position.
    ///
    /// The zone is computed purely from the longitude; the Norway and Svalbard
    /// exceptions are not applied.
    pub fn utm_for(p: Position) -> Self {
        let zone = (((p.lon + 180.0) / 6.0).floor() as i64 + 1).clamp(1, 60) as u8;
        Self::Utm {
            zone,
            north: p.lat >= 0.0,
        }
    }

    /// Returns the UTM zone containing the mean of all provided positions,
    /// or `None` if there are no positions.
    pub fn utm_for_positions<I: IntoIterator<Item = Position>>(positions: I) -> Option<Self> {
        let (count, lat_sum, lon_sum) = positions
            .into_iter()
            .fold((0usize, 0.0, 0.0), |(count, lat_sum, lon_sum), p| {
                (count + 1, lat_sum + p.lat, lon_sum + p.lon)
            });

        if count == 0 {
            return None;
        }

        let n = count as f64;
        Some(Self::utm_for(Position::new(lat_sum / n, lon_sum / n)))
    }

    /// Returns the [EPSG](https://epsg.io/) code of this coordinate reference system.
    pub fn epsg(&self) -> u32 {
        match *self {
            Self::Wgs84 => 4326,
            Self::WebMercator => 3857,
            Self::Utm { zone, north: true } => 32600 + zone as u32,
            Self::Utm { zone, north: false } => 32700 + zone as u32,
        }
    }

    /// Creates the PROJ transformations between WGS84 and this system.
    pub fn projection(&self) -> Result<Projection, Error> {
        Projection::new(*self)
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.epsg())
    }
}

impl FromStr for Crs {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unsupported = || Error::UnsupportedCrs(s.to_string());

        let code = s.trim();
        let code = match code.get(..5) {
            Some(prefix) if prefix.eq_ignore_ascii_case("epsg:") => &code[5..],
            _ => code,
        };
        let code: u32 = code.parse().map_err(|_| unsupported())?;

        match code {
            4326 => Ok(Self::Wgs84),
            3857 => Ok(Self::WebMercator),
            32601..=32660 => Ok(Self::Utm {
                zone: (code - 32600) as u8,
                north: true,
            }),
            32701..=32760 => Ok(Self::Utm {
                zone: (code - 32700) as u8,
                north: false,
            }),
            _ => Err(unsupported()),
        }
    }
}

/// Forward (WGS84 → CRS) and inverse (CRS → WGS84) PROJ transformations.
///
/// [Proj] objects can't be shared between threads, hence the mutexes.
struct Transforms {
    forward: Mutex<Proj>,
    inverse: Mutex<Proj>,
}

// SAFETY: every Proj owns its own PJ_CONTEXT and is only ever accessed
// through its Mutex, so it is never used from two threads at once.
unsafe impl Send for Transforms {}
unsafe impl Sync for Transforms {}

/// Converts [Positions](Position) into planar coordinates of a [Crs] and back,
/// using [PROJ](https://proj.org/).
///
/// Building the underlying transformations is relatively expensive,
/// so a Projection should be created once and reused.
pub struct Projection {
    crs: Crs,

    /// `None` for [Crs::Wgs84], where no transformation is necessary.
    transforms: Option<Transforms>,
}

impl Projection {
    pub fn new(crs: Crs) -> Result<Self, Error> {
        let transforms = match crs {
            Crs::Wgs84 => None,
            _ => {
                // Known CRS are normalized to the "visualization" axis order,
                // so geographic coordinates are always passed as (lon, lat).
                let target = crs.to_string();
                Some(Transforms {
                    forward: Mutex::new(Proj::new_known_crs("EPSG:4326", &target, None)?),
                    inverse: Mutex::new(Proj::new_known_crs(&target, "EPSG:4326", None)?),
                })
            }
        };
        Ok(Self { crs, transforms })
    }

    pub fn crs(&self) -> Crs {
        self.crs
    }

    /// Converts a WGS84 position into planar `[x, y]` coordinates.
    pub fn project(&self, p: Position) -> Result<[f64; 2], Error> {
        match self.transforms {
            None => Ok([p.lon, p.lat]),
            Some(ref t) => {
                let forward = t.forward.lock().unwrap_or_else(PoisonError::into_inner);
                let (x, y) = forward.convert((p.lon, p.lat))?;
                Ok([x, y])
            }
        }
    }

    /// Converts every position, preserving order.
    pub fn project_all(&self, positions: &[Position]) -> Result<Vec<[f64; 2]>, Error> {
        positions.iter().map(|&p| self.project(p)).collect()
    }

    /// Converts planar `[x, y]` coordinates back into a WGS84 position.
    pub fn unproject(&self, xy: [f64; 2]) -> Result<Position, Error> {
        match self.transforms {
            None => Ok(Position::new(xy[1], xy[0])),
            Some(ref t) => {
                let inverse = t.inverse.lock().unwrap_or_else(PoisonError::into_inner);
                let (lon, lat) = inverse.convert((xy[0], xy[1]))?;
                Ok(Position::new(lat, lon))
            }
        }
    }
}

impl fmt::Debug for Projection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Projection").field("crs", &self.crs).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{earth_distance, planar_distance};

    macro_rules! assert_almost_eq {
        ($a:expr, $b:expr, $eps:expr) => {
            assert!(
                (($a - $b).abs() < $eps),
                "assertion failed: {} ≈ {}",
                $a,
                $b
            )
        };
    }

    #[test]
    fn utm_zone_selection() {
        assert_eq!(
            Crs::utm_for(Position::new(52.9225, -1.4746)),
            Crs::Utm {
                zone: 30,
                north: true
            }
        );
        assert_eq!(
            Crs::utm_for(Position::new(-33.87, 151.21)),
            Crs::Utm {
                zone: 56,
                north: false
            }
        );
        assert_eq!(
            Crs::utm_for(Position::new(0.0, 180.0)),
            Crs::Utm {
                zone: 60,
                north: true
            }
        );
    }

    #[test]
    fn utm_zone_of_positions() {
        assert_eq!(Crs::utm_for_positions(Vec::<Position>::new()), None);

        // Mean position (52.91, -1.45) lies in zone 30,
        // even though one of the points is in zone 31.
        assert_eq!(
            Crs::utm_for_positions(vec![
                Position::new(52.90, -1.60),
                Position::new(52.92, -1.30),
                Position::new(52.91, 0.10),
                Position::new(52.91, -3.00),
            ]),
            Some(Crs::Utm {
                zone: 30,
                north: true
            })
        );

        assert_eq!(
            Crs::utm_for_positions(vec![Position::new(-33.80, 151.10), Position::new(-33.94, 151.30)]),
            Some(Crs::Utm {
                zone: 56,
                north: false
            })
        );
    }

    #[test]
    fn epsg_codes() {
        assert_eq!(Crs::Wgs84.to_string(), "EPSG:4326");
        assert_eq!(Crs::WebMercator.to_string(), "EPSG:3857");
        assert_eq!(
            Crs::Utm {
                zone: 30,
                north: true
            }
            .to_string(),
            "EPSG:32630"
        );

        assert_eq!("epsg:3857".parse::<Crs>().unwrap(), Crs::WebMercator);
        assert_eq!(
            "EPSG:32756".parse::<Crs>().unwrap(),
            Crs::Utm {
                zone: 56,
                north: false
            }
        );
        assert!("EPSG:27700".parse::<Crs>().is_err());
        assert!("mercator".parse::<Crs>().is_err());
    }

    #[test]
    fn wgs84_is_identity() {
        let p = Crs::Wgs84.projection().unwrap();
        assert_eq!(p.project(Position::new(52.9, -1.48)).unwrap(), [-1.48, 52.9]);
        assert_eq!(p.unproject([-1.48, 52.9]).unwrap(), Position::new(52.9, -1.48));
    }

    #[test]
    fn utm_known_points() {
        let p = Crs::Utm {
            zone: 31,
            north: true,
        }
        .projection()
        .unwrap();
        let [x, y] = p.project(Position::new(0.0, 3.0)).unwrap();
        assert_almost_eq!(x, 500_000.0, 1e-3);
        assert_almost_eq!(y, 0.0, 1e-3);

        // London
        let p = "EPSG:32630".parse::<Crs>().unwrap().projection().unwrap();
        let [x, y] = p.project(Position::new(51.5074, -0.1278)).unwrap();
        assert_almost_eq!(x, 699_316.2, 1.0);
        assert_almost_eq!(y, 5_710_163.8, 1.0);
    }

    #[test]
    fn utm_round_trip() {
        let p = Crs::utm_for(Position::new(52.9225, -1.4746)).projection().unwrap();
        for &(lat, lon) in &[(52.9225, -1.4746), (52.86, -1.56), (52.96, -1.39), (60.0, -5.5)] {
            let back = p.unproject(p.project(Position::new(lat, lon)).unwrap()).unwrap();
            assert_almost_eq!(back.lat, lat, 1e-6);
            assert_almost_eq!(back.lon, lon, 1e-6);
        }

        let south = Crs::utm_for(Position::new(-33.87, 151.21)).projection().unwrap();
        let [_, y] = south.project(Position::new(-33.87, 151.21)).unwrap();
        assert!(y > 6_000_000.0 && y < 10_000_000.0, "{}", y);
        let back = south.unproject(south.project(Position::new(-33.87, 151.21)).unwrap()).unwrap();
        assert_almost_eq!(back.lat, -33.87, 1e-6);
        assert_almost_eq!(back.lon, 151.21, 1e-6);
    }

    #[test]
    fn utm_preserves_short_distances() {
        let a = Position::new(52.9100, -1.4700);
        let b = Position::new(52.9300, -1.4100);
        let p = Crs::utm_for(a).projection().unwrap();

        let great_circle = earth_distance(a.lat, a.lon, b.lat, b.lon);
        let planar = planar_distance(p.project(a).unwrap(), p.project(b).unwrap());

        // UTM scale error is below 0.1% near the central meridian
        assert!((planar / great_circle - 1.0).abs() < 0.003, "{} vs {}", planar, great_circle);
    }

    #[test]
    fn web_mercator() {
        let p = Crs::WebMercator.projection().unwrap();
        let [x, y] = p.project(Position::new(0.0, 0.0)).unwrap();
        assert_almost_eq!(x, 0.0, 1e-6);
        assert_almost_eq!(y, 0.0, 1e-6);

        let [x, _] = p.project(Position::new(0.0, 180.0)).unwrap();
        assert_almost_eq!(x, 20_037_508.342_789_244, 1e-3);

        let back = p.unproject(p.project(Position::new(52.9225, -1.4746)).unwrap()).unwrap();
        assert_almost_eq!(back.lat, 52.9225, 1e-9);
        assert_almost_eq!(back.lon, -1.4746, 1e-9);
    }
}
