//! Coordinate name detection.
//!
//! Two naming conventions are recognized, checked in order:
//! COARDS (`lat`, `lon`, `lat_b`, `lon_b`) and CF 1.6
//! (`latitude`, `longitude`, `latitude_b`, `longitude_b`).

use crate::dataset::GridDescription;
use crate::error::{RegridError, Result};

const CENTER_CONVENTIONS: [(&str, &str); 2] = [("lat", "lon"), ("latitude", "longitude")];
const BOUNDARY_CONVENTIONS: [(&str, &str); 2] =
    [("lat_b", "lon_b"), ("latitude_b", "longitude_b")];

/// Resolved latitude/longitude field names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinateNames {
    pub lat: String,
    pub lon: String,
}

impl CoordinateNames {
    pub fn new(lat: impl Into<String>, lon: impl Into<String>) -> Self {
        Self {
            lat: lat.into(),
            lon: lon.into(),
        }
    }
}

/// Find the latitude/longitude field names of a grid description.
///
/// With `boundary` set, the cell corner names are looked up instead of the
/// cell center names. The first convention whose latitude field is present
/// wins.
pub fn locate_coordinates<G>(grid: &G, boundary: bool) -> Result<CoordinateNames>
where
    G: GridDescription + ?Sized,
{
    let conventions = if boundary {
        &BOUNDARY_CONVENTIONS
    } else {
        &CENTER_CONVENTIONS
    };

    conventions
        .iter()
        .find(|(lat, _)| grid.contains(lat))
        .map(|(lat, lon)| CoordinateNames::new(*lat, *lon))
        .ok_or(RegridError::ConventionNotRecognized { boundary })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr1, ArrayD};
    use std::collections::HashMap;

    fn grid(keys: &[&str]) -> HashMap<String, ArrayD<f64>> {
        keys.iter()
            .map(|k| (k.to_string(), arr1(&[0.0]).into_dyn()))
            .collect()
    }

    #[test]
    fn test_coards_names() {
        let names = locate_coordinates(&grid(&["lat", "lon", "t2m"]), false).unwrap();
        assert_eq!(names, CoordinateNames::new("lat", "lon"));
    }

    #[test]
    fn test_cf_names() {
        let names = locate_coordinates(&grid(&["latitude", "longitude"]), false).unwrap();
        assert_eq!(names, CoordinateNames::new("latitude", "longitude"));
    }

    #[test]
    fn test_coards_wins_when_both_present() {
        let names =
            locate_coordinates(&grid(&["latitude", "longitude", "lat", "lon"]), false).unwrap();
        assert_eq!(names.lat, "lat");
    }

    #[test]
    fn test_boundary_names() {
        let names = locate_coordinates(&grid(&["lat", "lon", "lat_b", "lon_b"]), true).unwrap();
        assert_eq!(names, CoordinateNames::new("lat_b", "lon_b"));

        let names = locate_coordinates(&grid(&["latitude_b", "longitude_b"]), true).unwrap();
        assert_eq!(names, CoordinateNames::new("latitude_b", "longitude_b"));
    }

    #[test]
    fn test_unrecognized_convention() {
        let result = locate_coordinates(&grid(&["y", "x"]), false);
        assert!(matches!(
            result,
            Err(RegridError::ConventionNotRecognized { boundary: false })
        ));

        // centers alone do not satisfy a boundary lookup
        let result = locate_coordinates(&grid(&["lat", "lon"]), true);
        assert!(matches!(
            result,
            Err(RegridError::ConventionNotRecognized { boundary: true })
        ));
    }
}
