use super::common::*;
use serde_json::json;

use crate::indicators::IndicatorRecord;

#[tokio::test]
async fn breakdown_lists_raw_values_bounds_and_rank() {
    let service = build_service(seeded_store().await);
    let breakdown = service
        .score_breakdown("32", 2024)
        .await
        .expect("computed")
        .expect("province has data");

    assert_eq!(breakdown.province_name.as_deref(), Some("Jawa Barat"));
    assert_eq!(breakdown.rank, Some(2));
    assert_eq!(breakdown.composite_score, Some(50.0));

    let collections: Vec<&str> = breakdown
        .collections
        .iter()
        .map(|entry| entry.collection.as_str())
        .collect();
    assert_eq!(collections, vec![IPM, TPT]);

    let unemployment = &breakdown.collections[1];
    assert_eq!(unemployment.display_name, "Tingkat Pengangguran Terbuka");
    assert_close(unemployment.raw_value, 6.0);
    assert_close(unemployment.min_value, 4.0);
    assert_close(unemployment.max_value, 8.0);
    assert_close(unemployment.score, 50.0);
    assert!(unemployment.lower_is_better);
    assert_eq!(unemployment.skipped_records, 0);
}

#[tokio::test]
async fn breakdown_matches_bulk_ranking() {
    let service = build_service(seeded_store().await);
    let ranked = service
        .calculate_all_scores_for_year(2024)
        .await
        .expect("ranking");

    for score in &ranked {
        let breakdown = service
            .score_breakdown(&score.province_id, 2024)
            .await
            .expect("computed")
            .expect("ranked provinces have a breakdown");
        assert_eq!(breakdown.rank, score.rank);
        assert_eq!(breakdown.composite_score, Some(score.composite_score));
        assert_eq!(breakdown.collections.len(), score.collections_scored);
    }
}

#[tokio::test]
async fn breakdown_reports_skipped_records() {
    let mut broken = IndicatorRecord::new("33", 2024);
    broken.values.insert("data".to_string(), json!({ "agustus": null }));
    let store = store_with(vec![
        (TPT, tpt("31", 2024, 4.0)),
        (TPT, tpt("32", 2024, 8.0)),
        (TPT, broken),
    ])
    .await;
    let service = build_service(store);

    let breakdown = service
        .score_breakdown("31", 2024)
        .await
        .expect("computed")
        .expect("data");
    assert_eq!(breakdown.collections.len(), 1);
    assert_eq!(breakdown.collections[0].skipped_records, 1);
    assert_close(breakdown.collections[0].score, 100.0);

    assert!(service
        .score_breakdown("33", 2024)
        .await
        .expect("computed")
        .is_none());
}

#[tokio::test]
async fn breakdown_for_empty_year_is_absent() {
    let service = build_service(seeded_store().await);
    assert!(service
        .score_breakdown("11", 2099)
        .await
        .expect("computed")
        .is_none());
}
