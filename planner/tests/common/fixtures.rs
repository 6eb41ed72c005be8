//! Test fixtures and data for planner tests

use shared::{ClusterMap, Sku, Store};

/// Standard test data and fixtures
pub struct TestFixtures;

impl TestFixtures {
    pub const SKUS_CSV: &'static str = "sku_id,category,cost,category_score\n\
                                        SKU1,tops,10,0.9\n\
                                        SKU2,tops,20,0.8\n\
                                        SKU3,shoes,5,0.7\n\
                                        SKU4,shoes,15,0.6\n";

    pub const STORES_CSV: &'static str = "store_id,capacity,footfall,region\n\
                                          S1,100,1000,north\n\
                                          S2,110,1100,north\n\
                                          S3,105,1050,north\n\
                                          S4,500,5000,south\n\
                                          S5,510,5100,south\n\
                                          S6,490,4900,south\n\
                                          S7,1000,200,east\n\
                                          S8,1010,210,east\n\
                                          S9,990,190,east\n";

    pub const DEFAULT_BUDGET: f64 = 25.0;
    pub const DEFAULT_CAP: i64 = 3;

    /// The two-SKU catalog used by the worked allocation examples
    pub fn two_sku_catalog() -> Vec<Sku> {
        vec![Sku::new("SKU1", 10.0), Sku::new("SKU2", 20.0)]
    }

    /// SKUs with varied prices in catalog (and priority) order
    pub fn mixed_catalog() -> Vec<Sku> {
        [7.0, 3.0, 12.0, 1.0, 5.0, 9.0, 2.0, 4.0]
            .iter()
            .enumerate()
            .map(|(i, price)| Sku::new(format!("SKU{}", i + 1), *price))
            .collect()
    }

    pub fn two_stores() -> ClusterMap {
        [("S1", 0), ("S2", 1)].into_iter().collect()
    }

    pub fn five_stores() -> ClusterMap {
        [("S1", 0), ("S2", 0), ("S3", 1), ("S4", 1), ("S5", 2)].into_iter().collect()
    }

    /// Nine stores in three well separated groups
    pub fn grouped_stores() -> Vec<Store> {
        let groups = [(100.0, 1000.0), (500.0, 5000.0), (1000.0, 200.0)];
        (0..9)
            .map(|i| {
                let (capacity, footfall) = groups[i / 3];
                let jitter = (i % 3) as f64;
                Store::new(format!("S{}", i + 1))
                    .with_feature("capacity", capacity + jitter)
                    .with_feature("footfall", footfall + jitter * 10.0)
            })
            .collect()
    }

    pub fn features() -> Vec<String> {
        vec!["capacity".to_string(), "footfall".to_string()]
    }
}
