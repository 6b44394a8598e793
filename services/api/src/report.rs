use crate::infra::build_store;
use chrono::Local;
use clap::Args;
use regional_gap::config::AppConfig;
use regional_gap::error::AppError;
use regional_gap::indicators::{BpsProvinceDirectory, IndicatorRegistry};
use regional_gap::scoring::{CompositeScore, NationalStatistics, YearScoringService};
use regional_gap::store::{ImportSummary, InMemoryIndicatorStore, SeedImporter};
use std::fmt::Write as _;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct ScoresArgs {
    /// Year to rank
    #[arg(long)]
    pub(crate) year: i32,
    /// Seed file to score (defaults to APP_DATA_PATH)
    #[arg(long)]
    pub(crate) data: Option<PathBuf>,
    /// Only print the best N provinces
    #[arg(long)]
    pub(crate) top: Option<usize>,
}

#[derive(Args, Debug)]
pub(crate) struct ImportArgs {
    /// JSON snapshot or long-format CSV to validate
    #[arg(long)]
    pub(crate) data: PathBuf,
}

pub(crate) async fn run_scores(args: ScoresArgs) -> Result<(), AppError> {
    let ScoresArgs { year, data, top } = args;

    let seed_path = match data {
        Some(path) => Some(path),
        None => AppConfig::load()?.data.seed_path,
    };
    let store = build_store(seed_path.as_deref()).await?;
    let registry = Arc::new(IndicatorRegistry::bps_default()?);
    let service = YearScoringService::new(store, Arc::new(BpsProvinceDirectory), registry);

    let ranked = service.calculate_all_scores_for_year(year).await?;
    if ranked.is_empty() {
        println!("No data found for year {year}");
        return Ok(());
    }

    let statistics = service.national_statistics(year).await?;
    let shown = match top {
        Some(count) => &ranked[..count.min(ranked.len())],
        None => &ranked[..],
    };

    print!(
        "{}",
        render_score_table(year, shown, ranked.len(), statistics.as_ref())
    );
    println!("Generated {}", Local::now().format("%Y-%m-%d %H:%M"));
    Ok(())
}

pub(crate) async fn run_import(args: ImportArgs) -> Result<(), AppError> {
    let registry = IndicatorRegistry::bps_default()?;
    let store = InMemoryIndicatorStore::new();
    let summary = SeedImporter::from_path(&store, &args.data).await?;

    println!("Seed file {} is valid", args.data.display());
    print!("{}", render_import_summary(&summary, &registry));
    Ok(())
}

pub(crate) fn render_score_table(
    year: i32,
    shown: &[CompositeScore],
    total: usize,
    statistics: Option<&NationalStatistics>,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Composite scores for {year} ({total} provinces ranked)");
    let _ = writeln!(
        out,
        "{:>4}  {:<4}  {:<28} {:>7}  {}",
        "rank", "code", "province", "score", "collections"
    );

    for score in shown {
        let rank = score
            .rank
            .map(|rank| rank.to_string())
            .unwrap_or_else(|| "-".to_string());
        let _ = writeln!(
            out,
            "{:>4}  {:<4}  {:<28} {:>7.2}  {}",
            rank,
            score.province_id,
            score.province_name,
            score.composite_score,
            score.collections_scored
        );
    }

    if let Some(statistics) = statistics {
        let _ = writeln!(out, "Median composite: {:.2}", statistics.median_score);
        if let Some(leader) = &statistics.leader {
            let _ = writeln!(out, "Leader: {} ({:.2})", leader.province_name, leader.score);
        }
        if let Some(critical) = &statistics.critical {
            let _ = writeln!(
                out,
                "Needs attention: {} ({:.2})",
                critical.province_name, critical.score
            );
        }
        if statistics.total_population > 0 {
            let _ = writeln!(
                out,
                "Population covered: {}",
                statistics.total_population
            );
        }
    }

    out
}

pub(crate) fn render_import_summary(
    summary: &ImportSummary,
    registry: &IndicatorRegistry,
) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "- {} rows -> {} records",
        summary.rows, summary.records_touched
    );
    for collection in &summary.collections {
        if registry.is_stored_collection(collection) {
            let _ = writeln!(out, "  - {collection}");
        } else {
            let _ = writeln!(out, "  - {collection} (not served by the dashboard)");
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use regional_gap::scoring::ProvinceInfo;
    use std::collections::{BTreeMap, BTreeSet};

    fn score(province_id: &str, name: &str, value: f64, rank: usize) -> CompositeScore {
        CompositeScore {
            province_id: province_id.to_string(),
            province_name: name.to_string(),
            year: 2024,
            composite_score: value,
            collection_scores: BTreeMap::new(),
            collections_scored: 2,
            rank: Some(rank),
            calculated_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn score_table_lists_rows_and_statistics() {
        let ranked = vec![
            score("31", "DKI Jakarta", 100.0, 1),
            score("33", "Jawa Tengah", 12.5, 2),
        ];
        let statistics = NationalStatistics {
            year: 2024,
            median_score: 56.25,
            leader: Some(ProvinceInfo::from(&ranked[0])),
            critical: Some(ProvinceInfo::from(&ranked[1])),
            total_population: 10_684_900,
            provinces_count: 2,
        };

        let table = render_score_table(2024, &ranked, 2, Some(&statistics));
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "Composite scores for 2024 (2 provinces ranked)");
        assert!(lines[2].contains("DKI Jakarta"));
        assert!(lines[2].contains("100.00"));
        assert!(lines[3].trim_start().starts_with('2'));
        assert!(table.contains("Median composite: 56.25"));
        assert!(table.contains("Needs attention: Jawa Tengah (12.50)"));
        assert!(table.contains("Population covered: 10684900"));
    }

    #[test]
    fn import_summary_flags_unserved_collections() {
        let registry = IndicatorRegistry::bps_default().expect("registry");
        let summary = ImportSummary {
            rows: 3,
            records_touched: 2,
            collections: BTreeSet::from([
                "kependudukan".to_string(),
                "luas_wilayah".to_string(),
            ]),
        };

        let rendered = render_import_summary(&summary, &registry);
        assert!(rendered.starts_with("- 3 rows -> 2 records"));
        assert!(rendered.contains("  - kependudukan\n"));
        assert!(rendered.contains("  - luas_wilayah (not served by the dashboard)"));
    }
}
