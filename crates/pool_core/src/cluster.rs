//! Virtual-stop clustering: DBSCAN over destination coordinates in raw
//! (lat, lng) degree space.
//!
//! Distances are plain Euclidean in coordinate degrees, not geodesic. At the
//! service's operating latitude an epsilon of 0.005 degrees approximates a
//! 500 m walking radius, which is close enough for grouping destinations; the
//! flattening error is far below the spacing between stops.

use linfa::traits::Transformer;
use linfa_clustering::Dbscan;
use ndarray::Array2;

use crate::request::{GeoPoint, VirtualStop};

#[derive(thiserror::Error, Debug)]
pub enum ClusterError {
    /// A non-finite or out-of-range coordinate reached the clusterer. Callers
    /// must exclude the offending request, not the whole pass.
    #[error("invalid destination coordinate ({lat}, {lng}) at input index {index}")]
    InvalidCoordinate { index: usize, lat: f64, lng: f64 },
    #[error("invalid clustering parameters: {0}")]
    Params(#[from] linfa_clustering::DbscanParamsError),
}

/// Cluster `points` into virtual stops.
///
/// Dense neighborhoods (DBSCAN with `epsilon` radius and `min_points` density
/// floor, the point itself included in its own neighborhood) each yield one
/// stop at the arithmetic mean of their member coordinates. Density noise is
/// not dropped: every noise point becomes its own single-point stop, so each
/// member destination is always resolvable to some stop.
///
/// Output order is dense clusters in discovery order, then noise stops in
/// input order — reproducible for a fixed input ordering and parameters.
pub fn cluster_virtual_stops(
    points: &[GeoPoint],
    epsilon: f64,
    min_points: usize,
) -> Result<Vec<VirtualStop>, ClusterError> {
    for (index, point) in points.iter().enumerate() {
        if !point.is_valid() {
            return Err(ClusterError::InvalidCoordinate {
                index,
                lat: point.lat,
                lng: point.lng,
            });
        }
    }
    if points.is_empty() {
        return Ok(Vec::new());
    }

    let flat: Vec<f64> = points.iter().flat_map(|p| [p.lat, p.lng]).collect();
    let data =
        Array2::from_shape_vec((points.len(), 2), flat).expect("two columns per input point");
    let data = data.as_standard_layout();
    let assignments = Dbscan::params(min_points).tolerance(epsilon).transform(&data)?;

    let cluster_count = assignments
        .iter()
        .copied()
        .flatten()
        .max()
        .map_or(0, |highest| highest + 1);

    let mut sums = vec![(0.0_f64, 0.0_f64, 0_usize); cluster_count];
    let mut noise = Vec::new();
    for (point, assignment) in points.iter().zip(assignments.iter()) {
        match assignment {
            Some(cluster) => {
                let entry = &mut sums[*cluster];
                entry.0 += point.lat;
                entry.1 += point.lng;
                entry.2 += 1;
            }
            None => noise.push(*point),
        }
    }

    let mut stops: Vec<VirtualStop> = sums
        .into_iter()
        .map(|(lat_sum, lng_sum, count)| VirtualStop {
            lat: lat_sum / count as f64,
            lng: lng_sum / count as f64,
        })
        .collect();
    stops.extend(noise.into_iter().map(|p| VirtualStop {
        lat: p.lat,
        lng: p.lng,
    }));
    Ok(stops)
}
