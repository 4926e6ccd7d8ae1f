use std::path::Path;

use serde::Deserialize;

use crate::error::{AbmError, Result};
use crate::facets::{Facet, FacetKind};

pub const BAIK: &str = "Baik";
pub const SEDANG: &str = "Sedang";
pub const KURANG: &str = "Kurang";
pub const TIDAK_TERUKUR: &str = "Tidak Terukur";
pub const MINAT: &str = "Minat";
pub const TIDAK_MINAT: &str = "Tidak Minat";

/// Stacking order for the primary chart, bottom segment first.
pub const APTITUDE_STACK_ORDER: [&str; 4] = [TIDAK_TERUKUR, KURANG, SEDANG, BAIK];
/// Stacking order for the drill-down charts.
pub const INTEREST_STACK_ORDER: [&str; 2] = [TIDAK_MINAT, MINAT];
/// Drill-down section order, strongest band first.
pub const APTITUDE_BANDS: [&str; 4] = [BAIK, SEDANG, KURANG, TIDAK_TERUKUR];

/// Domain constant: an interest score of 60 or more counts as "Minat".
pub const INTEREST_THRESHOLD: f64 = 60.0;

pub fn interest_band(score: f64) -> &'static str {
    if score >= INTEREST_THRESHOLD {
        MINAT
    } else {
        TIDAK_MINAT
    }
}

/// Cut points for the 4-way aptitude classification. The numbers are an
/// upstream business rule, so they arrive as data: a JSON rule file via
/// `from_path`, or the compiled-in defaults.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AptitudeRules {
    pub tidak_terukur_max: f64,
    pub kurang_max: f64,
    pub sedang_max: f64,
}

impl Default for AptitudeRules {
    fn default() -> Self {
        Self {
            tidak_terukur_max: 0.0,
            kurang_max: 45.0,
            sedang_max: 70.0,
        }
    }
}

impl AptitudeRules {
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let rules: Self = serde_json::from_str(&raw)?;
        rules.validate()?;
        Ok(rules)
    }

    pub fn validate(&self) -> Result<()> {
        if self.tidak_terukur_max > self.kurang_max || self.kurang_max > self.sedang_max {
            return Err(AbmError::InvalidRules(format!(
                "cut points must be ascending, got {} / {} / {}",
                self.tidak_terukur_max, self.kurang_max, self.sedang_max
            )));
        }
        Ok(())
    }

    pub fn band_for(&self, score: f64) -> &'static str {
        if score <= self.tidak_terukur_max {
            TIDAK_TERUKUR
        } else if score <= self.kurang_max {
            KURANG
        } else if score <= self.sedang_max {
            SEDANG
        } else {
            BAIK
        }
    }
}

/// Band for any facet: aptitude facets go through the rule table, interest
/// facets through the fixed threshold.
pub fn band_of(facet: &Facet, score: f64, rules: &AptitudeRules) -> &'static str {
    match facet.kind {
        FacetKind::Aptitude => rules.band_for(score),
        FacetKind::Interest => interest_band(score),
    }
}

/// Validate an operator-supplied aptitude band name.
pub fn parse_aptitude_band(name: &str) -> Result<&'static str> {
    APTITUDE_BANDS
        .iter()
        .find(|band| band.eq_ignore_ascii_case(name))
        .copied()
        .ok_or_else(|| AbmError::UnknownBand(name.to_string()))
}
