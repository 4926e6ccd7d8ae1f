use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, info};
use serde::Deserialize;

use crate::error::{AbmError, Result};
use crate::models::{Selection, StudentRecord};

/// Static filter-option catalog (`filters.json`). Only the province list is
/// needed up front; every deeper option domain comes from the data itself.
#[derive(Debug, Clone, Deserialize)]
pub struct FilterCatalog {
    #[serde(rename = "nm_prop")]
    pub provinces: Vec<String>,
}

impl FilterCatalog {
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let mut catalog: Self = serde_json::from_str(&raw)?;
        catalog.provinces.sort();
        catalog.provinces.dedup();
        Ok(catalog)
    }
}

#[derive(Debug, Deserialize)]
struct RawRow {
    nm_prop: String,
    nm_rayon: String,
    nm_sek: String,
    bakat_1: f64,
    bakat_2: f64,
    bakat_3: f64,
    bakat_4: f64,
    bakat_5: f64,
    bakat_6: f64,
    bakat_7: f64,
    minat_1: f64,
    minat_2: f64,
    minat_3: f64,
    minat_4: f64,
    minat_5: f64,
    minat_6: f64,
    minat_7: f64,
    minat_8: f64,
    minat_9: f64,
    minat_10: f64,
    minat_11: f64,
    minat_12: f64,
    minat_13: f64,
    minat_14: f64,
    minat_15: f64,
    minat_16: f64,
    minat_17: f64,
    minat_18: f64,
}

impl From<RawRow> for StudentRecord {
    fn from(row: RawRow) -> Self {
        StudentRecord {
            province: row.nm_prop,
            city: row.nm_rayon,
            school: row.nm_sek,
            bakat: [
                row.bakat_1,
                row.bakat_2,
                row.bakat_3,
                row.bakat_4,
                row.bakat_5,
                row.bakat_6,
                row.bakat_7,
            ],
            minat: [
                row.minat_1,
                row.minat_2,
                row.minat_3,
                row.minat_4,
                row.minat_5,
                row.minat_6,
                row.minat_7,
                row.minat_8,
                row.minat_9,
                row.minat_10,
                row.minat_11,
                row.minat_12,
                row.minat_13,
                row.minat_14,
                row.minat_15,
                row.minat_16,
                row.minat_17,
                row.minat_18,
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct SnapshotKey {
    provinces: Vec<String>,
    cities: Vec<String>,
}

impl SnapshotKey {
    fn new(provinces: &[String], cities: &[String]) -> Self {
        Self {
            provinces: normalized(provinces),
            cities: normalized(cities),
        }
    }
}

fn normalized(values: &[String]) -> Vec<String> {
    let set: BTreeSet<String> = values.iter().cloned().collect();
    set.into_iter().collect()
}

/// Reads the dataset CSV with province/city predicates applied while
/// streaming, and memoizes the resulting immutable snapshots by selection
/// key. Single-threaded; exact-match keys, no eviction.
pub struct DataStore {
    path: PathBuf,
    cache: HashMap<SnapshotKey, Arc<Vec<StudentRecord>>>,
}

impl DataStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cache: HashMap::new(),
        }
    }

    /// Records matching the province and city sets. An empty city set means
    /// no narrowing at that level.
    pub fn snapshot(
        &mut self,
        provinces: &[String],
        cities: &[String],
    ) -> Result<Arc<Vec<StudentRecord>>> {
        let key = SnapshotKey::new(provinces, cities);
        if let Some(hit) = self.cache.get(&key) {
            debug!("snapshot cache hit for {:?}/{:?}", key.provinces, key.cities);
            return Ok(hit.clone());
        }
        let records = self.load(&key)?;
        info!(
            "loaded {} records from {} for {:?}/{:?}",
            records.len(),
            self.path.display(),
            key.provinces,
            key.cities
        );
        let snapshot = Arc::new(records);
        self.cache.insert(key, snapshot.clone());
        Ok(snapshot)
    }

    /// Full hierarchical narrowing. No provinces selected means an empty
    /// subset, whatever the deeper levels say.
    pub fn resolve(&mut self, selection: &Selection) -> Result<Vec<StudentRecord>> {
        if selection.provinces.is_empty() {
            return Ok(Vec::new());
        }
        let snapshot = self.snapshot(&selection.provinces, &selection.cities)?;
        if selection.schools.is_empty() {
            return Ok(snapshot.as_ref().clone());
        }
        Ok(snapshot
            .iter()
            .filter(|record| selection.schools.contains(&record.school))
            .cloned()
            .collect())
    }

    /// Cities observed under the chosen provinces, sorted and distinct.
    pub fn available_cities(&mut self, provinces: &[String]) -> Result<Vec<String>> {
        if provinces.is_empty() {
            return Ok(Vec::new());
        }
        let snapshot = self.snapshot(provinces, &[])?;
        Ok(distinct_sorted(
            snapshot.iter().map(|record| record.city.clone()),
        ))
    }

    /// Schools observed under the chosen provinces and cities, sorted and
    /// distinct.
    pub fn available_schools(
        &mut self,
        provinces: &[String],
        cities: &[String],
    ) -> Result<Vec<String>> {
        if provinces.is_empty() {
            return Ok(Vec::new());
        }
        let snapshot = self.snapshot(provinces, cities)?;
        Ok(distinct_sorted(
            snapshot.iter().map(|record| record.school.clone()),
        ))
    }

    fn load(&self, key: &SnapshotKey) -> Result<Vec<StudentRecord>> {
        let mut reader = csv::Reader::from_path(&self.path).map_err(|e| self.dataset_error(e))?;
        let mut records = Vec::new();
        for result in reader.deserialize::<RawRow>() {
            let row = result.map_err(|e| self.dataset_error(e))?;
            if !key.provinces.is_empty() && !key.provinces.contains(&row.nm_prop) {
                continue;
            }
            if !key.cities.is_empty() && !key.cities.contains(&row.nm_rayon) {
                continue;
            }
            records.push(row.into());
        }
        Ok(records)
    }

    fn dataset_error(&self, source: csv::Error) -> AbmError {
        AbmError::Dataset {
            path: self.path.display().to_string(),
            source,
        }
    }
}

fn distinct_sorted(values: impl Iterator<Item = String>) -> Vec<String> {
    let set: BTreeSet<String> = values.collect();
    set.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn dataset_csv(rows: &[(&str, &str, &str, f64)]) -> String {
        let mut header: Vec<String> =
            vec!["nm_prop".to_string(), "nm_rayon".to_string(), "nm_sek".to_string()];
        header.extend((1..=7).map(|i| format!("bakat_{i}")));
        header.extend((1..=18).map(|i| format!("minat_{i}")));
        let mut out = header.join(",");
        out.push('\n');
        for (province, city, school, score) in rows {
            let mut fields = vec![
                (*province).to_string(),
                (*city).to_string(),
                (*school).to_string(),
            ];
            fields.extend(std::iter::repeat(score.to_string()).take(25));
            out.push_str(&fields.join(","));
            out.push('\n');
        }
        out
    }

    fn dataset_file(rows: &[(&str, &str, &str, f64)]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(dataset_csv(rows).as_bytes()).unwrap();
        file
    }

    fn sample_rows() -> Vec<(&'static str, &'static str, &'static str, f64)> {
        vec![
            ("Jawa Barat", "Bandung", "SMAN 1 Bandung", 80.0),
            ("Jawa Barat", "Bandung", "SMAN 2 Bandung", 50.0),
            ("Jawa Barat", "Bogor", "SMAN 1 Bogor", 65.0),
            ("Jawa Timur", "Surabaya", "SMAN 5 Surabaya", 90.0),
        ]
    }

    fn provinces(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn empty_province_selection_resolves_to_nothing() {
        // The early return means no file access at all.
        let mut store = DataStore::open("does-not-exist.csv");
        let selection = Selection::new(
            Vec::new(),
            provinces(&["Bandung"]),
            provinces(&["SMAN 1 Bandung"]),
        );
        assert!(store.resolve(&selection).unwrap().is_empty());
    }

    #[test]
    fn snapshot_pushes_province_and_city_predicates_down() {
        let file = dataset_file(&sample_rows());
        let mut store = DataStore::open(file.path());

        let by_province = store.snapshot(&provinces(&["Jawa Barat"]), &[]).unwrap();
        assert_eq!(by_province.len(), 3);
        assert!(by_province.iter().all(|r| r.province == "Jawa Barat"));

        let by_city = store
            .snapshot(&provinces(&["Jawa Barat"]), &provinces(&["Bogor"]))
            .unwrap();
        assert_eq!(by_city.len(), 1);
        assert_eq!(by_city[0].school, "SMAN 1 Bogor");
    }

    #[test]
    fn option_domains_cascade_from_the_previous_level() {
        let file = dataset_file(&sample_rows());
        let mut store = DataStore::open(file.path());

        let cities = store.available_cities(&provinces(&["Jawa Barat"])).unwrap();
        assert_eq!(cities, vec!["Bandung".to_string(), "Bogor".to_string()]);
        assert!(!cities.contains(&"Surabaya".to_string()));

        let schools = store
            .available_schools(&provinces(&["Jawa Barat"]), &provinces(&["Bandung"]))
            .unwrap();
        assert_eq!(
            schools,
            vec!["SMAN 1 Bandung".to_string(), "SMAN 2 Bandung".to_string()]
        );

        assert!(store.available_cities(&[]).unwrap().is_empty());
    }

    #[test]
    fn school_narrowing_applies_in_memory() {
        let file = dataset_file(&sample_rows());
        let mut store = DataStore::open(file.path());
        let selection = Selection::new(
            provinces(&["Jawa Barat"]),
            provinces(&["Bandung"]),
            provinces(&["SMAN 2 Bandung"]),
        );
        let records = store.resolve(&selection).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].school, "SMAN 2 Bandung");
        assert!((records[0].minat[0] - 50.0).abs() < 1e-9);
    }

    #[test]
    fn repeated_keys_reuse_the_cached_snapshot() {
        let file = dataset_file(&sample_rows());
        let mut store = DataStore::open(file.path());
        let first = store
            .snapshot(&provinces(&["Jawa Barat", "Jawa Timur"]), &[])
            .unwrap();
        let second = store
            .snapshot(&provinces(&["Jawa Barat", "Jawa Timur"]), &[])
            .unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        // Selection order must not split the cache.
        let reordered = store
            .snapshot(&provinces(&["Jawa Timur", "Jawa Barat"]), &[])
            .unwrap();
        assert!(Arc::ptr_eq(&first, &reordered));
    }

    #[test]
    fn malformed_rows_are_fatal_with_file_context() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"nm_prop,nm_rayon,nm_sek,bakat_1\nJawa Barat,Bandung,SMAN 1,oops\n")
            .unwrap();
        let mut store = DataStore::open(file.path());
        let err = store
            .snapshot(&provinces(&["Jawa Barat"]), &[])
            .unwrap_err();
        assert!(matches!(err, AbmError::Dataset { .. }));
    }

    #[test]
    fn catalog_loads_sorted_distinct_provinces() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(br#"{"nm_prop": ["Jawa Timur", "Aceh", "Jawa Timur"]}"#)
            .unwrap();
        let catalog = FilterCatalog::from_path(file.path()).unwrap();
        assert_eq!(
            catalog.provinces,
            vec!["Aceh".to_string(), "Jawa Timur".to_string()]
        );
    }
}
