use crate::error::{AbmError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FacetKind {
    Aptitude,
    Interest,
}

/// One scored facet of the survey. `slot` indexes into the matching score
/// array on `StudentRecord`.
#[derive(Debug, Clone, Copy)]
pub struct Facet {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FacetKind,
    pub slot: usize,
}

const fn aptitude(key: &'static str, label: &'static str, slot: usize) -> Facet {
    Facet {
        key,
        label,
        kind: FacetKind::Aptitude,
        slot,
    }
}

const fn interest(key: &'static str, label: &'static str, slot: usize) -> Facet {
    Facet {
        key,
        label,
        kind: FacetKind::Interest,
        slot,
    }
}

/// The fixed facet catalog: 7 aptitude scales and 18 interest scales, with
/// the display labels the charting layer shows.
pub static FACETS: [Facet; 25] = [
    aptitude("bakat_1", "Kemampuan Spasial", 0),
    aptitude("bakat_2", "Kemampuan Verbal", 1),
    aptitude("bakat_3", "Penalaran", 2),
    aptitude("bakat_4", "Kemampuan Klerikal", 3),
    aptitude("bakat_5", "Kemampuan Mekanika", 4),
    aptitude("bakat_6", "Kemampuan Kuantitatif", 5),
    aptitude("bakat_7", "Kemampuan Bahasa", 6),
    interest("minat_1", "Fasilitasi Sosial", 0),
    interest("minat_2", "Pengelolaan", 1),
    interest("minat_3", "Detail Bisnis", 2),
    interest("minat_4", "Pengelolaan Data", 3),
    interest("minat_5", "Keteknikan", 4),
    interest("minat_6", "Kerja Lapangan", 5),
    interest("minat_7", "Kesenian", 6),
    interest("minat_8", "Helping", 7),
    interest("minat_9", "Sains Sosial", 8),
    interest("minat_10", "Influence", 9),
    interest("minat_11", "Sistem Bisnis", 10),
    interest("minat_12", "Analisis Finansial", 11),
    interest("minat_13", "Kerja Ilmiah", 12),
    interest("minat_14", "Quality Control", 13),
    interest("minat_15", "Kerja Manual", 14),
    interest("minat_16", "Personal Service", 15),
    interest("minat_17", "Keteknisian", 16),
    interest("minat_18", "Layanan Dasar", 17),
];

pub fn lookup(key: &str) -> Result<&'static Facet> {
    FACETS
        .iter()
        .find(|facet| facet.key == key)
        .ok_or_else(|| AbmError::UnknownFacet(key.to_string()))
}

pub fn aptitude_keys() -> Vec<&'static str> {
    keys_of_kind(FacetKind::Aptitude)
}

pub fn interest_keys() -> Vec<&'static str> {
    keys_of_kind(FacetKind::Interest)
}

fn keys_of_kind(kind: FacetKind) -> Vec<&'static str> {
    FACETS
        .iter()
        .filter(|facet| facet.kind == kind)
        .map(|facet| facet.key)
        .collect()
}

/// Display label for a facet key; unknown keys fall through unchanged so
/// renderers never lose a column.
pub fn label_for(key: &str) -> &str {
    match FACETS.iter().find(|facet| facet.key == key) {
        Some(facet) => facet.label,
        None => key,
    }
}
