//! Score a birthdate CSV for outliers
//!
//! Usage: cargo run --bin detect_outliers -- birthdates.csv --top 10

use anyhow::{Context, Result};
use birthdate_quality::{
    analysis::{top_agreement, Analysis, AnalysisConfig, BirthdateAnalyzer},
    anomaly::{Band, IsolationForestConfig, ZScoreThresholds},
    data::{parse_birthdate, RecordSet},
    features::FeatureKind,
};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about = "Score a birthdate dataset for anomalies")]
struct Args {
    /// Path to the input CSV file
    input: String,

    /// Header name of the date column
    #[arg(long, default_value = "birthdates")]
    date_column: String,

    /// Feature to score: age, ordinal
    #[arg(short, long, default_value = "age")]
    feature: String,

    /// Reference date for age computation (YYYY-MM-DD, default today)
    #[arg(long)]
    reference_date: Option<String>,

    /// Sentinel date to exclude (repeatable, default 2000-01-01)
    #[arg(long)]
    sentinel: Vec<String>,

    /// Z-score suspect boundary
    #[arg(long, default_value_t = 1.0)]
    suspect: f64,

    /// Z-score anomalous boundary
    #[arg(long, default_value_t = 3.0)]
    anomalous: f64,

    /// Number of trees in the isolation forest
    #[arg(short, long, default_value_t = 100)]
    estimators: usize,

    /// Subsample size per tree (default min(256, n))
    #[arg(long)]
    max_samples: Option<usize>,

    /// Expected outlier proportion in [0, 0.5]
    #[arg(short, long)]
    contamination: Option<f64>,

    /// Random seed for reproducible runs
    #[arg(short, long)]
    seed: Option<u64>,

    /// Number of outliers to report from each end
    #[arg(short, long, default_value_t = 10)]
    top: usize,

    /// Print the full analysis as JSON instead of tables
    #[arg(long)]
    json: bool,
}

fn build_config(args: &Args) -> Result<AnalysisConfig> {
    let feature = match args.feature.as_str() {
        "age" => FeatureKind::Age,
        "ordinal" => FeatureKind::DateOrdinal,
        other => anyhow::bail!("unknown feature '{other}', expected 'age' or 'ordinal'"),
    };

    let mut forest = IsolationForestConfig::new().n_estimators(args.estimators);
    if let Some(samples) = args.max_samples {
        forest = forest.max_samples(samples);
    }
    if let Some(fraction) = args.contamination {
        forest = forest.contamination(fraction);
    }
    if let Some(seed) = args.seed {
        forest = forest.seed(seed);
    }

    let mut config = AnalysisConfig::new()
        .feature(feature)
        .thresholds(ZScoreThresholds::new(args.suspect, args.anomalous)?)
        .forest(forest);

    if let Some(raw) = &args.reference_date {
        config = config.reference_date(parse_birthdate(raw)?);
    }
    if !args.sentinel.is_empty() {
        let sentinels = args
            .sentinel
            .iter()
            .map(|raw| parse_birthdate(raw))
            .collect::<birthdate_quality::Result<Vec<_>>>()?;
        config = config.sentinels(sentinels);
    }

    Ok(config)
}

fn print_report(analysis: &Analysis, top: usize) {
    println!("Birthdate Quality Report");
    println!("========================");
    println!("Reference date: {}", analysis.reference_date);
    println!(
        "Records: {} total, {} sentinel(s) removed, {} scored",
        analysis.total_records, analysis.filtered_out, analysis.stats.count
    );
    println!(
        "Mean: {:.3}  Std: {:.3}",
        analysis.stats.mean, analysis.stats.std_dev
    );

    let mut normal = 0;
    let mut suspect = 0;
    let mut anomalous = 0;
    for row in analysis.zscore.iter() {
        match row.outcome.band {
            Band::Normal => normal += 1,
            Band::Suspect => suspect += 1,
            Band::Anomalous => anomalous += 1,
        }
    }
    println!("Bands: {normal} normal, {suspect} suspect, {anomalous} anomalous");

    let sorted = analysis.zscore.sorted(true);
    println!("\nZ-score, top {top} left tail:");
    for row in sorted.top(top) {
        println!(
            "  #{:<6} {}  age={:<4} z={:+.3} [{}]",
            row.index,
            row.birthdate,
            row.features.age,
            row.outcome.zscore,
            row.outcome.band.name()
        );
    }
    println!("\nZ-score, top {top} right tail:");
    for row in sorted.bottom(top).iter().rev() {
        println!(
            "  #{:<6} {}  age={:<4} z={:+.3} [{}]",
            row.index,
            row.birthdate,
            row.features.age,
            row.outcome.zscore,
            row.outcome.band.name()
        );
    }

    let iso_sorted = analysis.isolation.sorted(true);
    println!("\nIsolation forest, {top} most anomalous:");
    for row in iso_sorted.top(top) {
        println!(
            "  #{:<6} {}  age={:<4} score={:+.4} [{}]",
            row.index,
            row.birthdate,
            row.features.age,
            row.outcome.score,
            row.outcome.label.name()
        );
    }

    let shared = top_agreement(&analysis.zscore, &analysis.isolation, top);
    println!("\nMethods agree on {shared} of their {top} most anomalous records");
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();
    let config = build_config(&args)?;

    let records = RecordSet::from_csv(&args.input, &args.date_column)
        .with_context(|| format!("failed to load {}", args.input))?;

    let analyzer = BirthdateAnalyzer::new(config)?;
    let analysis = analyzer
        .analyze(&records)
        .context("scoring pass failed")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
    } else {
        print_report(&analysis, args.top);
    }

    Ok(())
}
