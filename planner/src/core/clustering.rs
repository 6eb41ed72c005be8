//! Store clustering
//!
//! Deterministic k-means over z-score standardized store features. Seeding
//! picks the first store, then repeatedly the store farthest from every
//! chosen centroid, so identical inputs always give identical clusters.
//! When no cluster count is requested, k is chosen by silhouette score.

use std::collections::{BTreeMap, BTreeSet};
use std::ops::RangeInclusive;

use shared::{
    component_debug, ClusterId, ClusterMap, ClusterResponse, ClusterStats, ComponentId, Store, StoreCluster,
    StoreId,
};

use crate::error::{PlannerError, PlannerResult};
use crate::traits::ClusterAssigner;

/// Which features to cluster on and how many clusters to build
#[derive(Debug, Clone, PartialEq)]
pub struct ClusteringParams {
    pub features: Vec<String>,
    pub k: Option<usize>,
}

impl ClusteringParams {
    pub fn new(features: Vec<String>, k: Option<usize>) -> Self {
        Self { features, k }
    }
}

/// Result of a clustering run
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterAssignment {
    pub cluster_map: ClusterMap,
    pub k: usize,
    pub silhouette: Option<f64>,
    pub stats: BTreeMap<ClusterId, ClusterStats>,
}

impl ClusterAssignment {
    pub fn to_response(&self) -> ClusterResponse {
        ClusterResponse {
            clusters: self
                .cluster_map
                .iter()
                .map(|(store_id, cluster_id)| StoreCluster {
                    store_id: store_id.clone(),
                    cluster_id,
                })
                .collect(),
            silhouette: self.silhouette,
            k: self.k,
            cluster_stats: self.stats.clone(),
        }
    }
}

/// K-means cluster assigner
#[derive(Debug, Clone)]
pub struct KMeansAssigner {
    max_iterations: usize,
    k_range: RangeInclusive<usize>,
}

impl KMeansAssigner {
    pub fn new() -> Self {
        Self {
            max_iterations: 100,
            k_range: 3..=8,
        }
    }

    /// Candidate range for automatic k selection
    pub fn with_k_range(mut self, k_range: RangeInclusive<usize>) -> Self {
        self.k_range = k_range;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations.max(1);
        self
    }

    fn choose_k(&self, points: &[Vec<f64>]) -> (Vec<usize>, Option<f64>) {
        let n = points.len();
        let hi = (*self.k_range.end()).min(n.saturating_sub(1));
        let lo = (*self.k_range.start()).max(2).min(hi);
        if hi < 2 {
            return (vec![0; n], None);
        }

        let mut best: Option<(Vec<usize>, f64)> = None;
        for k in lo..=hi {
            let labels = kmeans(points, k, self.max_iterations);
            let Some(score) = silhouette_score(points, &labels) else {
                continue;
            };
            component_debug!(ComponentId::current(), "k={} silhouette={:.4}", k, score);
            let better = match &best {
                Some((_, best_score)) => score > *best_score,
                None => true,
            };
            if better {
                best = Some((labels, score));
            }
        }

        match best {
            Some((labels, score)) => (labels, Some(score)),
            None => (vec![0; n], None),
        }
    }
}

impl Default for KMeansAssigner {
    fn default() -> Self {
        Self::new()
    }
}

impl ClusterAssigner for KMeansAssigner {
    fn assign(&self, stores: &[Store], params: &ClusteringParams) -> PlannerResult<ClusterAssignment> {
        let ordered = ordered_stores(stores)?;
        let raw = feature_matrix(&ordered, &params.features)?;
        let points = standardize(&raw);
        let n = points.len();

        let (labels, silhouette) = match params.k {
            Some(0) => return Err(PlannerError::config("k", "cluster count must be positive")),
            Some(k) if k > n => {
                return Err(PlannerError::config("k", format!("cannot build {k} clusters from {n} stores")))
            }
            Some(k) => {
                let labels = kmeans(&points, k, self.max_iterations);
                let found = labels.iter().collect::<BTreeSet<_>>().len();
                if found < k {
                    return Err(PlannerError::ClusteringError {
                        reason: format!("only {found} distinct clusters for k = {k}; store features are too uniform"),
                    });
                }
                let score = silhouette_score(&points, &labels);
                (labels, score)
            }
            None => self.choose_k(&points),
        };

        let labels = relabel_by_first_appearance(&labels);
        let k = labels.iter().collect::<BTreeSet<_>>().len();

        let cluster_map: ClusterMap = ordered
            .iter()
            .zip(&labels)
            .map(|(store, &label)| (store.id.clone(), ClusterId(label as u32)))
            .collect();
        let stats = cluster_stats(&raw, &labels, &params.features);

        component_debug!(
            ComponentId::current(),
            "Clustered {} stores into {} clusters (silhouette {:?})",
            n,
            k,
            silhouette
        );

        Ok(ClusterAssignment {
            cluster_map,
            k,
            silhouette,
            stats,
        })
    }
}

/// Returns a caller-supplied cluster map after checking it covers every store
#[derive(Debug, Clone)]
pub struct StaticAssigner {
    cluster_map: ClusterMap,
}

impl StaticAssigner {
    pub fn new(cluster_map: ClusterMap) -> Self {
        Self { cluster_map }
    }
}

impl ClusterAssigner for StaticAssigner {
    fn assign(&self, stores: &[Store], params: &ClusteringParams) -> PlannerResult<ClusterAssignment> {
        if self.cluster_map.is_empty() {
            return Err(PlannerError::config("cluster_map", "cluster map is empty"));
        }
        if let Some(missing) = stores.iter().find(|s| !self.cluster_map.contains(&s.id)) {
            return Err(PlannerError::config(
                "cluster_map",
                format!("store '{}' has no cluster", missing.id),
            ));
        }

        // Stats are only available for stores we were given
        let covered: Vec<&Store> = stores.iter().collect();
        let labels: Vec<usize> = covered
            .iter()
            .filter_map(|s| self.cluster_map.get(&s.id))
            .map(|c| c.0 as usize)
            .collect();
        let stats = match feature_matrix(&covered, &params.features) {
            Ok(raw) if !raw.is_empty() => cluster_stats(&raw, &labels, &params.features),
            _ => BTreeMap::new(),
        };

        Ok(ClusterAssignment {
            k: self.cluster_map.cluster_count(),
            cluster_map: self.cluster_map.clone(),
            silhouette: None,
            stats,
        })
    }
}

fn ordered_stores(stores: &[Store]) -> PlannerResult<Vec<&Store>> {
    if stores.is_empty() {
        return Err(PlannerError::config("stores", "no stores to cluster"));
    }
    let mut ordered: Vec<&Store> = stores.iter().collect();
    ordered.sort_by(|a, b| a.id.cmp(&b.id));

    let mut seen: BTreeSet<&StoreId> = BTreeSet::new();
    for store in &ordered {
        if !seen.insert(&store.id) {
            return Err(PlannerError::config("stores", format!("duplicate store id '{}'", store.id)));
        }
    }
    Ok(ordered)
}

fn feature_matrix(stores: &[&Store], features: &[String]) -> PlannerResult<Vec<Vec<f64>>> {
    if features.is_empty() {
        return Err(PlannerError::config("features", "at least one feature is required"));
    }
    stores
        .iter()
        .map(|store| {
            features
                .iter()
                .map(|name| match store.feature(name) {
                    Some(v) if v.is_finite() => Ok(v),
                    Some(v) => Err(PlannerError::config(
                        "features",
                        format!("store '{}' has non-finite {name} = {v}", store.id),
                    )),
                    None => Err(PlannerError::config(
                        "features",
                        format!("store '{}' is missing feature '{name}'", store.id),
                    )),
                })
                .collect()
        })
        .collect()
}

fn standardize(raw: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let n = raw.len() as f64;
    let dims = raw.first().map(Vec::len).unwrap_or(0);
    let mut out = raw.to_vec();

    for d in 0..dims {
        let mean = raw.iter().map(|row| row[d]).sum::<f64>() / n;
        let var = raw.iter().map(|row| (row[d] - mean).powi(2)).sum::<f64>() / n;
        let std = var.sqrt();
        for row in out.iter_mut() {
            row[d] = if std > 0.0 { (row[d] - mean) / std } else { 0.0 };
        }
    }
    out
}

fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum()
}

fn nearest(point: &[f64], centroids: &[Vec<f64>]) -> usize {
    let mut best = 0;
    let mut best_dist = f64::INFINITY;
    for (i, c) in centroids.iter().enumerate() {
        let d = squared_distance(point, c);
        // strict comparison keeps the lowest index on ties
        if d < best_dist {
            best = i;
            best_dist = d;
        }
    }
    best
}

fn seed_centroids(points: &[Vec<f64>], k: usize) -> Vec<Vec<f64>> {
    let mut centroids = vec![points[0].clone()];
    let mut min_dist: Vec<f64> = points.iter().map(|p| squared_distance(p, &points[0])).collect();

    while centroids.len() < k {
        let mut far_idx = 0;
        let mut far_dist = -1.0;
        for (i, &d) in min_dist.iter().enumerate() {
            if d > far_dist {
                far_idx = i;
                far_dist = d;
            }
        }
        let next = points[far_idx].clone();
        for (i, p) in points.iter().enumerate() {
            min_dist[i] = min_dist[i].min(squared_distance(p, &next));
        }
        centroids.push(next);
    }
    centroids
}

/// Lloyd iterations from deterministic seeds; returns one label per point
pub fn kmeans(points: &[Vec<f64>], k: usize, max_iterations: usize) -> Vec<usize> {
    if points.is_empty() || k == 0 {
        return Vec::new();
    }
    let k = k.min(points.len());
    let dims = points[0].len();
    let mut centroids = seed_centroids(points, k);
    let mut labels: Vec<usize> = points.iter().map(|p| nearest(p, &centroids)).collect();

    for _ in 0..max_iterations {
        let mut sums = vec![vec![0.0; dims]; k];
        let mut counts = vec![0usize; k];
        for (p, &label) in points.iter().zip(&labels) {
            counts[label] += 1;
            for (s, x) in sums[label].iter_mut().zip(p) {
                *s += x;
            }
        }
        for (c, (sum, count)) in centroids.iter_mut().zip(sums.into_iter().zip(counts)) {
            // empty clusters keep their previous centroid
            if count > 0 {
                *c = sum.into_iter().map(|s| s / count as f64).collect();
            }
        }

        let next: Vec<usize> = points.iter().map(|p| nearest(p, &centroids)).collect();
        if next == labels {
            break;
        }
        labels = next;
    }
    labels
}

/// Mean silhouette coefficient; `None` with fewer than two clusters
pub fn silhouette_score(points: &[Vec<f64>], labels: &[usize]) -> Option<f64> {
    let clusters: BTreeSet<usize> = labels.iter().copied().collect();
    if clusters.len() < 2 || clusters.len() >= points.len() {
        return None;
    }

    let mut total = 0.0;
    for (i, p) in points.iter().enumerate() {
        let mut sum_by_cluster: BTreeMap<usize, (f64, usize)> = BTreeMap::new();
        for (j, q) in points.iter().enumerate() {
            if i == j {
                continue;
            }
            let entry = sum_by_cluster.entry(labels[j]).or_insert((0.0, 0));
            entry.0 += squared_distance(p, q).sqrt();
            entry.1 += 1;
        }

        let own = labels[i];
        let a = match sum_by_cluster.get(&own) {
            Some((sum, count)) if *count > 0 => sum / *count as f64,
            // singleton cluster
            _ => continue,
        };
        let b = sum_by_cluster
            .iter()
            .filter(|(label, _)| **label != own)
            .map(|(_, (sum, count))| sum / *count as f64)
            .fold(f64::INFINITY, f64::min);

        let denom = a.max(b);
        if denom > 0.0 {
            total += (b - a) / denom;
        }
    }
    Some(total / points.len() as f64)
}

fn relabel_by_first_appearance(labels: &[usize]) -> Vec<usize> {
    let mut mapping: BTreeMap<usize, usize> = BTreeMap::new();
    labels
        .iter()
        .map(|label| {
            let next = mapping.len();
            *mapping.entry(*label).or_insert(next)
        })
        .collect()
}

fn cluster_stats(raw: &[Vec<f64>], labels: &[usize], features: &[String]) -> BTreeMap<ClusterId, ClusterStats> {
    let mut sums: BTreeMap<usize, (Vec<f64>, usize)> = BTreeMap::new();
    for (row, &label) in raw.iter().zip(labels) {
        let entry = sums.entry(label).or_insert_with(|| (vec![0.0; features.len()], 0));
        for (s, x) in entry.0.iter_mut().zip(row) {
            *s += x;
        }
        entry.1 += 1;
    }

    sums.into_iter()
        .map(|(label, (sum, count))| {
            let feature_means = features
                .iter()
                .zip(sum)
                .map(|(name, s)| (name.clone(), s / count as f64))
                .collect();
            (
                ClusterId(label as u32),
                ClusterStats {
                    store_count: count,
                    feature_means,
                },
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(id: &str, capacity: f64, footfall: f64) -> Store {
        Store::new(id)
            .with_feature("capacity", capacity)
            .with_feature("footfall", footfall)
    }

    fn three_groups() -> Vec<Store> {
        vec![
            store("S1", 100.0, 300.0),
            store("S2", 105.0, 310.0),
            store("S3", 98.0, 295.0),
            store("S4", 200.0, 800.0),
            store("S5", 210.0, 790.0),
            store("S6", 205.0, 805.0),
            store("S7", 400.0, 150.0),
            store("S8", 395.0, 160.0),
            store("S9", 410.0, 140.0),
        ]
    }

    fn params(k: Option<usize>) -> ClusteringParams {
        ClusteringParams::new(vec!["capacity".to_string(), "footfall".to_string()], k)
    }

    #[test]
    fn test_explicit_k_separates_groups() {
        let result = KMeansAssigner::new().assign(&three_groups(), &params(Some(3))).unwrap();
        assert_eq!(result.k, 3);

        let map = &result.cluster_map;
        let c = |id: &str| map.get(&StoreId::from(id)).unwrap();
        assert_eq!(c("S1"), c("S2"));
        assert_eq!(c("S1"), c("S3"));
        assert_eq!(c("S4"), c("S6"));
        assert_eq!(c("S7"), c("S9"));
        assert_ne!(c("S1"), c("S4"));
        assert_ne!(c("S4"), c("S7"));
        // first store always gets cluster 0
        assert_eq!(c("S1"), ClusterId(0));
    }

    #[test]
    fn test_auto_k_prefers_natural_grouping() {
        let result = KMeansAssigner::new().assign(&three_groups(), &params(None)).unwrap();
        assert_eq!(result.k, 3);
        assert!(result.silhouette.unwrap() > 0.5);

        let stats = &result.stats[&ClusterId(0)];
        assert_eq!(stats.store_count, 3);
        assert!((stats.feature_means["capacity"] - 101.0).abs() < 1e-9);
    }

    #[test]
    fn test_k_range_bounds_automatic_choice() {
        let result = KMeansAssigner::new()
            .with_k_range(2..=2)
            .with_max_iterations(10)
            .assign(&three_groups(), &params(None))
            .unwrap();
        assert_eq!(result.k, 2);
        assert!(result.silhouette.is_some());
    }

    #[test]
    fn test_explicit_k_on_uniform_stores_is_clustering_error() {
        let stores: Vec<Store> = (1..=4).map(|i| store(&format!("S{i}"), 100.0, 300.0)).collect();
        let err = KMeansAssigner::new().assign(&stores, &params(Some(3))).unwrap_err();
        assert!(matches!(err, PlannerError::ClusteringError { .. }));

        // automatic k falls back to one cluster instead
        let result = KMeansAssigner::new().assign(&stores, &params(None)).unwrap();
        assert_eq!(result.k, 1);
    }

    #[test]
    fn test_clustering_is_deterministic() {
        let mut shuffled = three_groups();
        shuffled.reverse();
        let a = KMeansAssigner::new().assign(&three_groups(), &params(None)).unwrap();
        let b = KMeansAssigner::new().assign(&shuffled, &params(None)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_tiny_inputs_fall_back_to_one_cluster() {
        let stores = vec![store("S1", 1.0, 1.0), store("S2", 2.0, 2.0)];
        let result = KMeansAssigner::new().assign(&stores, &params(None)).unwrap();
        assert_eq!(result.k, 1);
        assert_eq!(result.silhouette, None);
        assert_eq!(result.cluster_map.len(), 2);
    }

    #[test]
    fn test_invalid_inputs_are_configuration_errors() {
        let assigner = KMeansAssigner::new();
        assert!(assigner.assign(&[], &params(None)).unwrap_err().is_configuration());
        assert!(assigner.assign(&three_groups(), &params(Some(0))).unwrap_err().is_configuration());
        assert!(assigner.assign(&three_groups(), &params(Some(20))).unwrap_err().is_configuration());

        let missing = vec![Store::new("S1").with_feature("capacity", 1.0)];
        assert!(assigner.assign(&missing, &params(Some(1))).unwrap_err().is_configuration());

        let dup = vec![store("S1", 1.0, 1.0), store("S1", 2.0, 2.0)];
        assert!(assigner.assign(&dup, &params(Some(1))).unwrap_err().is_configuration());
    }

    #[test]
    fn test_static_assigner_requires_full_coverage() {
        let map: ClusterMap = [("S1", 0), ("S2", 1)].into_iter().collect();
        let assigner = StaticAssigner::new(map.clone());

        let ok = assigner
            .assign(&[store("S1", 1.0, 1.0), store("S2", 5.0, 5.0)], &params(None))
            .unwrap();
        assert_eq!(ok.cluster_map, map);
        assert_eq!(ok.k, 2);
        assert_eq!(ok.stats[&ClusterId(1)].feature_means["capacity"], 5.0);

        let err = assigner.assign(&[store("S3", 1.0, 1.0)], &params(None)).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_silhouette_needs_two_clusters() {
        let points = vec![vec![0.0], vec![1.0], vec![10.0], vec![11.0]];
        assert_eq!(silhouette_score(&points, &[0, 0, 0, 0]), None);
        let score = silhouette_score(&points, &[0, 0, 1, 1]).unwrap();
        assert!(score > 0.8);
    }
}
