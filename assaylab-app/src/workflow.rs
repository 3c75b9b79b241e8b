use crate::config::LabConfig;
use crate::plotting::{self, ChartSize};
use anyhow::{bail, Context, Result};
use assaylab_core::{
    export,
    grouping::{self, ChartMode, GroupSummary, HplcFilter},
    hplc, ingest,
    samples::{EvaluatedSample, SampleBook},
};
use assaylab_schemas::{
    assay::AssayKind,
    hplc::{HplcAnalysisType, HplcSampleResult},
};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

fn chart_size(config: &LabConfig) -> ChartSize {
    ChartSize {
        width: config.export.chart_width,
        height: config.export.chart_height,
    }
}

/// File-system safe version of a compound or factor name.
fn slug(name: &str) -> String {
    let slug: String = name
        .chars()
        .map(|c| if c.is_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect();
    slug.trim_matches('_').to_string()
}

/// Ingests a CSV upload, computes every sample and writes the reports.
pub fn run_spectro(
    config: &LabConfig,
    kind: AssayKind,
    input: &Path,
    output_dir: &Path,
    mode: ChartMode,
) -> Result<Vec<EvaluatedSample>> {
    println!("\n--- [Workflow] {} ---", kind.title());

    let drafts = ingest::read_samples_csv(input, kind)
        .with_context(|| format!("Failed to load samples from {:?}", input))?;
    let mut book = SampleBook::new(kind);
    book.create_many(drafts);
    info!(samples = book.len(), assay = %kind, "samples loaded");

    let evaluated = book.evaluate_all(&config.calibration);
    let decimals = config.export.decimals;

    let results_csv =
        export::sample_results_csv(&evaluated, kind, config.export.locale, decimals)?;
    export::write_report(output_dir.join("results.csv"), &results_csv)?;

    let statistics = grouping::treatment_statistics(&evaluated);
    export::write_report(
        output_dir.join("statistics.csv"),
        &export::statistics_csv(&statistics, decimals)?,
    )?;

    let unit = evaluated
        .iter()
        .find(|e| e.outcome.is_available())
        .map(|e| e.outcome.unit)
        .unwrap_or_else(|| kind.unit());
    let chart_data = grouping::treatment_chart_data(&evaluated, mode);
    let size = chart_size(config);
    plotting::plot_bar_chart(
        &output_dir.join("bar_chart.png"),
        kind.title(),
        unit,
        &chart_data,
        size,
    )?;
    plotting::plot_box_plot(
        &output_dir.join("box_plot.png"),
        &format!("{} distribution", kind.title()),
        unit,
        &grouping::boxplots(&grouping::treatment_chart_data(
            &evaluated,
            ChartMode::Grouped,
        )),
        size,
    )?;

    print_spectro_report(kind, &evaluated, &statistics, unit);
    Ok(evaluated)
}

/// Lists the extraction outputs (`*.json`) in `input_dir`, sorted by name.
fn extraction_files(input_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(input_dir)
        .with_context(|| format!("Failed to read directory: {:?}", input_dir))?
    {
        let path = entry?.path();
        if path.is_file() && path.extension().map_or(false, |ext| ext == "json") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Matches every chromatogram in `input_dir` against the configured
/// standards, quantifies the peaks and writes the reports.
pub fn run_hplc(
    config: &LabConfig,
    analysis_type: HplcAnalysisType,
    input_dir: &Path,
    output_dir: &Path,
) -> Result<Vec<HplcSampleResult>> {
    println!("\n--- [Workflow] HPLC {} ---", analysis_type);

    let standards = &config.hplc.standards;
    if standards.is_empty() {
        bail!("No retention-time standards configured; add them under `hplc.standards`");
    }

    let files = extraction_files(input_dir)?;
    if files.is_empty() {
        bail!("No extraction outputs (*.json) found in {:?}", input_dir);
    }

    let mut results = Vec::new();
    for path in &files {
        let extraction = hplc::read_extraction_file(path)?;
        let file_name = extraction.file_name.unwrap_or_default();
        let chromatogram = hplc::process_chromatogram(
            &file_name,
            &extraction.peaks,
            standards,
            analysis_type,
            &config.hplc.calibration,
        );
        println!("  - {}: {} compounds", file_name, chromatogram.len());
        results.extend(chromatogram);
    }

    let unit = analysis_type.unit();
    export::write_report(
        output_dir.join("hplc_results.csv"),
        &export::hplc_results_csv(&results, analysis_type)?,
    )?;

    let statistics = grouping::compound_statistics(&results, &HplcFilter::default());
    export::write_report(
        output_dir.join("compound_statistics.csv"),
        &export::statistics_csv(&statistics, config.export.decimals)?,
    )?;

    let size = chart_size(config);
    for compound in grouping::distinct(&results, |r| r.compound.as_str()) {
        let data = grouping::compound_chart_data(&results, compound);
        if data.is_empty() {
            warn!(compound, "no concentrations, chart skipped");
            continue;
        }
        plotting::plot_bar_chart(
            &output_dir.join(format!("compound_{}.png", slug(compound))),
            compound,
            unit,
            &data,
            size,
        )?;
    }
    for factor in grouping::distinct(&results, |r| r.factor.as_str()) {
        let data = grouping::factor_chart_data(&results, factor);
        if data.is_empty() {
            continue;
        }
        plotting::plot_bar_chart(
            &output_dir.join(format!("factor_{}.png", slug(factor))),
            &format!("Factor {}", factor),
            unit,
            &data,
            size,
        )?;
    }

    print_hplc_report(analysis_type, files.len(), &results, &statistics);
    Ok(results)
}

fn print_stat_rows(statistics: &[GroupSummary], unit: &str) {
    for g in statistics {
        let s = &g.summary;
        println!(
            "  - {} (n={}): {} ± {} {}  [SD {}, CV {}]",
            g.name,
            s.n,
            export::format_stat_card(s.mean),
            export::format_stat_card(s.std_err),
            unit,
            export::format_stat_card(s.std_dev),
            export::format_cv(s.cv),
        );
    }
}

fn print_spectro_report(
    kind: AssayKind,
    evaluated: &[EvaluatedSample],
    statistics: &[GroupSummary],
    unit: &str,
) {
    let available = evaluated.iter().filter(|e| e.outcome.is_available()).count();

    println!("\n\n--- [Summary Report] ---");
    println!("========================================");
    println!("Assay: {} ({})", kind.title(), kind);
    println!("Samples: {} ({} with results)", evaluated.len(), available);
    if available < evaluated.len() {
        println!("  Calibration is incomplete; missing results are reported as N/A.");
    }
    println!("----------------------------------------");

    if let Some(chl) = grouping::chlorophyll_summary(evaluated) {
        println!("\nPigments (mean ± SE, {}):", unit);
        for (label, s) in [
            ("Chl a", &chl.chl_a),
            ("Chl b", &chl.chl_b),
            ("Total chlorophyll", &chl.total),
            ("Carotenoid", &chl.carotenoid),
        ] {
            println!(
                "  - {}: {} ± {}",
                label,
                export::format_stat_card(s.mean),
                export::format_stat_card(s.std_err)
            );
        }
    }

    println!("\nBy treatment:");
    print_stat_rows(statistics, unit);
    println!("========================================");
}

fn print_hplc_report(
    analysis_type: HplcAnalysisType,
    file_count: usize,
    results: &[HplcSampleResult],
    statistics: &[GroupSummary],
) {
    let matched = results.iter().filter(|r| r.matched_rt.is_some()).count();
    let quantified = results.iter().filter(|r| r.concentration.is_some()).count();

    println!("\n\n--- [Summary Report] ---");
    println!("========================================");
    println!("Analysis: HPLC {}", analysis_type);
    println!("Chromatograms: {}", file_count);
    println!(
        "Compound results: {} ({} matched, {} quantified)",
        results.len(),
        matched,
        quantified
    );
    println!("----------------------------------------");
    println!("\nBy compound:");
    print_stat_rows(statistics, analysis_type.unit());
    println!("========================================");
}

/// Prints the upload template for `kind`.
pub fn print_template(kind: AssayKind) {
    println!("{}", export::sample_template(kind));
}

pub fn print_assays() {
    println!("Spectrophotometric assays:");
    for kind in AssayKind::ALL {
        println!(
            "  - {:<16} {:<36} {:<14} [{}]",
            kind.key(),
            kind.title(),
            kind.unit(),
            kind.required_wavelengths().join(", ")
        );
    }
    println!("\nHPLC analyses:");
    for analysis in HplcAnalysisType::ALL {
        println!(
            "  - {:<16} {:<16} {} compounds",
            analysis.key(),
            analysis.unit(),
            analysis.default_compounds().len()
        );
    }
}
