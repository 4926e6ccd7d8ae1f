use serde::Serialize;

use crate::facets::{Facet, FacetKind};

/// One survey row: region hierarchy plus the raw 0-100 scores for every
/// aptitude and interest facet.
#[derive(Debug, Clone, PartialEq)]
pub struct StudentRecord {
    pub province: String,
    pub city: String,
    pub school: String,
    pub bakat: [f64; 7],
    pub minat: [f64; 18],
}

impl StudentRecord {
    pub fn score(&self, facet: &Facet) -> f64 {
        match facet.kind {
            FacetKind::Aptitude => self.bakat[facet.slot],
            FacetKind::Interest => self.minat[facet.slot],
        }
    }
}

/// Region narrowing chosen by the operator. Provinces are mandatory for a
/// non-empty subset; empty city/school sets mean no narrowing at that level.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    pub provinces: Vec<String>,
    pub cities: Vec<String>,
    pub schools: Vec<String>,
}

impl Selection {
    pub fn new(provinces: Vec<String>, cities: Vec<String>, schools: Vec<String>) -> Self {
        Self {
            provinces,
            cities,
            schools,
        }
    }

    pub fn describe(&self) -> String {
        if self.provinces.is_empty() {
            return "no provinces selected".to_string();
        }
        let mut parts = vec![self.provinces.join(", ")];
        if !self.cities.is_empty() {
            parts.push(self.cities.join(", "));
        }
        if !self.schools.is_empty() {
            parts.push(self.schools.join(", "));
        }
        parts.join(" / ")
    }
}

/// One stacked-bar segment: how many records of a facet fell into a band,
/// and that count as a share of the facet's total.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BandShare {
    pub facet: String,
    pub band: String,
    pub count: usize,
    pub percentage: f64,
}
