use geo::{Distance, Geodesic};
use ndarray::Array2;
use rayon::prelude::*;

use crate::error::Result;
use crate::types::{AgentSet, CandidateSet, Location};

/// Geodesic (WGS84 ellipsoid) surface distance between two locations, in kilometres.
///
/// Symmetric by construction: the pair is put in a canonical order before the
/// inverse geodesic problem is solved, so `distance_km(a, b) == distance_km(b, a)`
/// holds bit for bit. Identical points are exactly 0.
pub fn distance_km(a: &Location, b: &Location) -> Result<f64> {
    a.validate()?;
    b.validate()?;

    if a == b { return Ok(0.0) }

    let (p, q) = if (a.lat, a.lon) <= (b.lat, b.lon) { (a, b) } else { (b, a) };
    let meters = Geodesic.distance(p.to_point(), q.to_point());

    Ok((meters / 1000.0).max(0.0))
}

/// Travel distances (km) between candidates (rows) and agents (columns).
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    km: Array2<f64>,
}

impl DistanceMatrix {
    /// Compute distances from every candidate at `rows` to every agent.
    ///
    /// Rows are computed in parallel; each cell is a pure function of two coordinates.
    /// With `round_km`, every cell is rounded to whole kilometres (ties to even).
    pub fn compute(candidates: &CandidateSet, rows: &[usize], agents: &AgentSet, round_km: bool) -> Result<Self> {
        let num_agents = agents.len();

        let cells = rows.par_iter()
            .map(|&row| {
                let from = &candidates.candidate(row).location;
                agents.agents().iter()
                    .map(|agent| {
                        let km = distance_km(from, &agent.location)?;
                        Ok(if round_km { km.round_ties_even() } else { km })
                    })
                    .collect::<Result<Vec<f64>>>()
            })
            .collect::<Result<Vec<Vec<f64>>>>()?;

        let km = Array2::from_shape_fn((rows.len(), num_agents), |(r, a)| cells[r][a]);

        tracing::debug!(rows = rows.len(), agents = num_agents, round_km, "[geom::distance] computed distance matrix");

        Ok(Self { km })
    }

    /// Wrap a precomputed (candidates, agents) matrix.
    #[inline] pub fn from_array(km: Array2<f64>) -> Self { Self { km } }

    /// Distance between the candidate at matrix row `row` and agent `agent`.
    #[inline] pub fn get(&self, row: usize, agent: usize) -> f64 { self.km[[row, agent]] }

    #[inline] pub fn num_rows(&self) -> usize { self.km.nrows() }

    #[inline] pub fn num_agents(&self) -> usize { self.km.ncols() }

    #[inline] pub fn as_array(&self) -> &Array2<f64> { &self.km }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::types::{Agent, Candidate, Label};

    fn loc(lat: f64, lon: f64) -> Location { Location { lat, lon } }

    #[test]
    fn self_distance_is_zero() {
        let p = loc(-23.55, -46.63);
        assert_eq!(distance_km(&p, &p).unwrap(), 0.0);
    }

    #[test]
    fn distance_is_symmetric() {
        let pairs = [
            (loc(-23.55, -46.63), loc(-22.91, -43.17)),
            (loc(0.0, 179.9), loc(0.0, -179.9)),
            (loc(89.0, 10.0), loc(-89.0, -170.0)),
        ];
        for (a, b) in pairs {
            assert_eq!(distance_km(&a, &b).unwrap(), distance_km(&b, &a).unwrap());
        }
    }

    #[test]
    fn sao_paulo_to_rio_is_about_360_km() {
        let d = distance_km(&loc(-23.5505, -46.6333), &loc(-22.9068, -43.1729)).unwrap();
        assert!((d - 361.0).abs() < 5.0, "got {d}");
    }

    #[test]
    fn one_degree_of_latitude_at_equator() {
        // WGS84 meridian arc from 0 to 1 degree is 110.574 km.
        let d = distance_km(&loc(0.0, 0.0), &loc(1.0, 0.0)).unwrap();
        assert!((d - 110.574).abs() < 0.01, "got {d}");
    }

    #[test]
    fn invalid_coordinates_fail() {
        assert!(matches!(distance_km(&loc(95.0, 0.0), &loc(0.0, 0.0)), Err(Error::Validation(_))));
        assert!(matches!(distance_km(&loc(0.0, 0.0), &loc(0.0, 200.0)), Err(Error::Validation(_))));
    }

    #[test]
    fn matrix_rounds_to_whole_kilometres() {
        let candidates = CandidateSet::new(vec![], vec![
            Candidate { id: "c0".into(), features: vec![], label: Label::Unknown, potential_value: 1.0, location: loc(0.0, 0.0) },
            Candidate { id: "c1".into(), features: vec![], label: Label::Excluded, potential_value: 1.0, location: loc(5.0, 5.0) },
            Candidate { id: "c2".into(), features: vec![], label: Label::Unknown, potential_value: 1.0, location: loc(1.0, 0.0) },
        ]).unwrap();
        let agents = AgentSet::new(vec![
            Agent { id: "a".into(), location: loc(0.0, 0.0) },
            Agent { id: "b".into(), location: loc(1.0, 0.0) },
        ]).unwrap();

        let matrix = DistanceMatrix::compute(&candidates, &[0, 2], &agents, true).unwrap();
        assert_eq!((matrix.num_rows(), matrix.num_agents()), (2, 2));
        assert_eq!(matrix.get(0, 0), 0.0);
        assert_eq!(matrix.get(0, 1), 111.0);
        assert_eq!(matrix.get(1, 0), 111.0);
        assert_eq!(matrix.get(1, 1), 0.0);

        let exact = DistanceMatrix::compute(&candidates, &[0], &agents, false).unwrap();
        assert!((exact.get(0, 1) - 110.574).abs() < 0.01);
    }
}
