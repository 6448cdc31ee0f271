use super::{Domain, Map};
use crate::geometry::PointCloud;

/// Domain samples, their images and the graph `(x | f(x))`, all in one frame
#[derive(Debug, Clone)]
pub struct Samples {
    domain: PointCloud,
    range: PointCloud,
    graph: PointCloud,
}

impl Samples {
    pub fn of(domain: &dyn Domain, map: &dyn Map) -> Self {
        Self::from_cloud(domain.to_cloud(), map)
    }

    /// Sample `map` over an existing cloud, keeping its frame.
    pub fn from_cloud(domain: PointCloud, map: &dyn Map) -> Self {
        let range = map.image_of(&domain);
        let graph = domain.glue(&range);
        Self { domain, range, graph }
    }

    pub fn domain(&self) -> &PointCloud {
        &self.domain
    }

    pub fn range(&self) -> &PointCloud {
        &self.range
    }

    pub fn graph(&self) -> &PointCloud {
        &self.graph
    }

    pub fn len(&self) -> usize {
        self.domain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domain.is_empty()
    }
}
