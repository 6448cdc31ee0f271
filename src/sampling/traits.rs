//! Sampling Traits: Standardized API for Domains and Maps
//!
//! Every sampled domain and every map under test implements one of these
//! traits so the kernel persistence algorithms can drive them uniformly:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Domain Trait                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  + count()             - Number of samples                  │
//! │  + dimension()         - Dimension of the sample points     │
//! │  + value_at(i)         - The i-th sample                    │
//! │  + contains(p)         - Membership of an arbitrary point   │
//! │  + to_cloud()          - All samples in a fresh frame       │
//! └─────────────────────────────────────────────────────────────┘
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         Map Trait                            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  + dimension()         - Dimension of the range             │
//! │  + value_at(p)         - Image of one point                 │
//! │  + image_of(cloud)     - Images of a cloud, same frame      │
//! └─────────────────────────────────────────────────────────────┘
//! ```

use crate::geometry::{Point, PointCloud};
use ndarray::{Array2, ArrayView1};

/// A finite, indexable set of sample points
pub trait Domain {
    /// Number of samples
    fn count(&self) -> usize;

    /// Dimension of every sample
    fn dimension(&self) -> usize;

    /// The sample at `index`, `index < count()`
    fn value_at(&self, index: usize) -> Point;

    /// Whether `point` lies in the domain (not only among the samples)
    fn contains(&self, point: ArrayView1<f64>) -> bool;

    /// Collect every sample, in index order, into a cloud with a fresh frame
    fn to_cloud(&self) -> PointCloud {
        let dim = self.dimension();
        let mut coords = Array2::zeros((self.count(), dim));
        for (i, mut row) in coords.rows_mut().into_iter().enumerate() {
            row.assign(&self.value_at(i));
        }
        PointCloud::new(coords)
    }
}

/// The function whose discontinuities are searched for
pub trait Map {
    /// Dimension of the range
    fn dimension(&self) -> usize;

    fn value_at(&self, point: ArrayView1<f64>) -> Point;

    /// Image of every point of `cloud`, kept in the cloud's frame so that
    /// position `k` of the result is the image of position `k`.
    fn image_of(&self, cloud: &PointCloud) -> PointCloud {
        let mut coords = Array2::zeros((cloud.len(), self.dimension()));
        for (mut row, p) in coords.rows_mut().into_iter().zip(cloud.points()) {
            let value = self.value_at(p);
            assert_eq!(value.len(), row.len(), "map returned a point of the wrong dimension");
            row.assign(&value);
        }
        cloud.sibling(coords)
    }
}
