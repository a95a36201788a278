mod distance;

pub use distance::{DistanceMatrix, distance_km};
