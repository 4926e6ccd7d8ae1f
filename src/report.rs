use std::fmt::Write;

use chrono::Utc;

use crate::aggregate;
use crate::bucket::{
    AptitudeRules, APTITUDE_BANDS, APTITUDE_STACK_ORDER, INTEREST_STACK_ORDER, MINAT,
};
use crate::error::Result;
use crate::facets;
use crate::models::{Selection, StudentRecord};

pub const DEFAULT_TOP_N: usize = 5;

/// Markdown rendition of the primary distribution, plus one drill-down
/// section per aptitude band when a facet was chosen to drill on.
pub fn build_report(
    selection: &Selection,
    records: &[StudentRecord],
    rules: &AptitudeRules,
    drill_facet: Option<&str>,
    top_n: usize,
) -> Result<String> {
    let mut output = String::new();

    let _ = writeln!(output, "# Analisis Bakat dan Minat");
    let _ = writeln!(
        output,
        "Generated for {} on {}",
        selection.describe(),
        Utc::now().date_naive()
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Distribusi Kategori Bakat");

    if records.is_empty() {
        let _ = writeln!(output, "No records match this selection.");
        return Ok(output);
    }

    let distribution = aggregate::aggregate(
        records,
        &facets::aptitude_keys(),
        &APTITUDE_STACK_ORDER,
        rules,
    )?;
    for row in &distribution {
        let _ = writeln!(
            output,
            "- {} [{}]: {} ({:.2}%)",
            facets::label_for(&row.facet),
            row.band,
            row.count,
            row.percentage
        );
    }

    let Some(drill_key) = drill_facet else {
        return Ok(output);
    };
    let drill_label = facets::label_for(drill_key);

    for band in APTITUDE_BANDS {
        let _ = writeln!(output);
        let _ = writeln!(
            output,
            "## Top {top_n} Minat untuk '{drill_label}' Kategori '{band}'"
        );
        let rows = aggregate::drill_down(
            records,
            drill_key,
            band,
            &facets::interest_keys(),
            &INTEREST_STACK_ORDER,
            MINAT,
            top_n,
            rules,
        )?;
        if rows.is_empty() {
            let _ = writeln!(output, "No records in this band.");
            continue;
        }
        for row in &rows {
            let _ = writeln!(
                output,
                "- {} [{}]: {} ({:.2}%)",
                facets::label_for(&row.facet),
                row.band,
                row.count,
                row.percentage
            );
        }
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record(minat_1: f64, bakat_1: f64) -> StudentRecord {
        let mut record = StudentRecord {
            province: "Jawa Barat".to_string(),
            city: "Bandung".to_string(),
            school: "SMAN 1".to_string(),
            bakat: [0.0; 7],
            minat: [0.0; 18],
        };
        record.minat[0] = minat_1;
        record.bakat[0] = bakat_1;
        record
    }

    fn selection() -> Selection {
        Selection::new(vec!["Jawa Barat".to_string()], Vec::new(), Vec::new())
    }

    #[test]
    fn report_covers_distribution_and_drill_sections() {
        let records = vec![sample_record(80.0, 90.0), sample_record(20.0, 90.0)];
        let report = build_report(
            &selection(),
            &records,
            &AptitudeRules::default(),
            Some("bakat_1"),
            DEFAULT_TOP_N,
        )
        .unwrap();

        assert!(report.contains("# Analisis Bakat dan Minat"));
        assert!(report.contains("## Distribusi Kategori Bakat"));
        assert!(report.contains("Kemampuan Spasial [Baik]: 2 (100.00%)"));
        assert!(report.contains("## Top 5 Minat untuk 'Kemampuan Spasial' Kategori 'Baik'"));
        assert!(report.contains("Fasilitasi Sosial [Minat]: 1 (50.00%)"));
        // Nobody landed in the weaker bands.
        assert!(report.contains("No records in this band."));
    }

    #[test]
    fn empty_selection_renders_a_prompt_not_charts() {
        let report = build_report(
            &Selection::default(),
            &[],
            &AptitudeRules::default(),
            Some("bakat_1"),
            DEFAULT_TOP_N,
        )
        .unwrap();
        assert!(report.contains("No records match this selection."));
        assert!(!report.contains("## Top"));
    }

    #[test]
    fn report_without_drill_facet_stops_at_the_distribution() {
        let records = vec![sample_record(80.0, 90.0)];
        let report = build_report(
            &selection(),
            &records,
            &AptitudeRules::default(),
            None,
            DEFAULT_TOP_N,
        )
        .unwrap();
        assert!(report.contains("## Distribusi Kategori Bakat"));
        assert!(!report.contains("## Top"));
    }
}
