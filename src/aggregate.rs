use std::collections::{HashMap, HashSet};

use crate::bucket::{self, AptitudeRules};
use crate::error::Result;
use crate::facets::{self, Facet};
use crate::models::{BandShare, StudentRecord};

/// Wide-to-long reshape: one (facet key, band) pair per record and facet,
/// restricted to `facet_keys`. Unknown keys fail fast.
pub fn melt(
    records: &[StudentRecord],
    facet_keys: &[&str],
    rules: &AptitudeRules,
) -> Result<Vec<(&'static str, &'static str)>> {
    let resolved = resolve_facets(facet_keys)?;
    Ok(melt_resolved(records, &resolved, rules))
}

/// Band distribution per facet: group-counts over the melted pairs, with
/// each count expressed as a percentage of its facet's total. Rows come out
/// ordered by facet input order, then by `band_order`; bands that never
/// occur are simply absent.
pub fn aggregate(
    records: &[StudentRecord],
    facet_keys: &[&str],
    band_order: &[&str],
    rules: &AptitudeRules,
) -> Result<Vec<BandShare>> {
    let resolved = resolve_facets(facet_keys)?;
    let mut counts: HashMap<(&'static str, &'static str), usize> = HashMap::new();
    let mut totals: HashMap<&'static str, usize> = HashMap::new();

    for (facet_key, band) in melt_resolved(records, &resolved, rules) {
        *counts.entry((facet_key, band)).or_insert(0) += 1;
        *totals.entry(facet_key).or_insert(0) += 1;
    }

    let mut rows = Vec::new();
    for facet in &resolved {
        let total = totals.get(facet.key).copied().unwrap_or(0);
        for band in band_order {
            if let Some(&count) = counts.get(&(facet.key, *band)) {
                let percentage = if total == 0 {
                    0.0
                } else {
                    100.0 * count as f64 / total as f64
                };
                rows.push(BandShare {
                    facet: facet.key.to_string(),
                    band: (*band).to_string(),
                    count,
                    percentage,
                });
            }
        }
    }
    Ok(rows)
}

/// Secondary aggregation behind a bar click: keep the records whose
/// `chosen_facet` lands in `chosen_band`, aggregate the secondary facets,
/// keep the `top_n` facets by `positive_band` count (ties resolve to the
/// first-seen facet in `secondary_keys`), and sort the surviving rows by
/// percentage descending for presentation. Facets without a single
/// positive record are never selected.
#[allow(clippy::too_many_arguments)]
pub fn drill_down(
    records: &[StudentRecord],
    chosen_facet: &str,
    chosen_band: &str,
    secondary_keys: &[&str],
    band_order: &[&str],
    positive_band: &str,
    top_n: usize,
    rules: &AptitudeRules,
) -> Result<Vec<BandShare>> {
    let chosen = facets::lookup(chosen_facet)?;
    let matching: Vec<StudentRecord> = records
        .iter()
        .filter(|record| bucket::band_of(chosen, record.score(chosen), rules) == chosen_band)
        .cloned()
        .collect();
    if matching.is_empty() {
        return Ok(Vec::new());
    }

    let rows = aggregate(&matching, secondary_keys, band_order, rules)?;

    let mut ranked: Vec<(&str, usize)> = Vec::new();
    for facet in resolve_facets(secondary_keys)? {
        let count = rows
            .iter()
            .find(|row| row.facet == facet.key && row.band == positive_band)
            .map(|row| row.count)
            .unwrap_or(0);
        if count > 0 {
            ranked.push((facet.key, count));
        }
    }
    // sort_by is stable, so equal counts keep their first-seen order
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    let keep: HashSet<&str> = ranked.iter().take(top_n).map(|(key, _)| *key).collect();

    let mut out: Vec<BandShare> = rows
        .into_iter()
        .filter(|row| keep.contains(row.facet.as_str()))
        .collect();
    out.sort_by(|a, b| {
        b.percentage
            .partial_cmp(&a.percentage)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    Ok(out)
}

fn melt_resolved(
    records: &[StudentRecord],
    resolved: &[&'static Facet],
    rules: &AptitudeRules,
) -> Vec<(&'static str, &'static str)> {
    let mut long = Vec::with_capacity(records.len() * resolved.len());
    for record in records {
        for facet in resolved {
            long.push((facet.key, bucket::band_of(facet, record.score(facet), rules)));
        }
    }
    long
}

fn resolve_facets(facet_keys: &[&str]) -> Result<Vec<&'static Facet>> {
    let mut seen = HashSet::new();
    let mut resolved = Vec::with_capacity(facet_keys.len());
    for key in facet_keys {
        let facet = facets::lookup(key)?;
        if seen.insert(facet.key) {
            resolved.push(facet);
        }
    }
    Ok(resolved)
}
