use super::common::*;

use crate::scoring::ranking;

#[tokio::test]
async fn bulk_ranking_is_descending_and_dense() {
    let service = build_service(seeded_store().await);
    let ranked = service
        .calculate_all_scores_for_year(2024)
        .await
        .expect("ranking computed");

    let order: Vec<(&str, usize)> = ranked
        .iter()
        .map(|score| (score.province_id.as_str(), score.rank.expect("ranked")))
        .collect();
    // 32 and 34 tie at 50; ascending province code keeps 32 first.
    assert_eq!(order, vec![("31", 1), ("32", 2), ("34", 3), ("33", 4)]);
    assert!(ranked
        .windows(2)
        .all(|pair| pair[0].composite_score >= pair[1].composite_score));
}

#[tokio::test]
async fn discovery_skips_codes_outside_bps_range() {
    let store = store_with(vec![
        (TPT, tpt("31", 2024, 4.0)),
        (TPT, tpt("99", 2024, 9.0)),
        (TPT, tpt("00", 2024, 5.0)),
        (IPM, ipm("9", 2024, 70.0)),
    ])
    .await;
    let service = build_service(store);

    let ranked = service
        .calculate_all_scores_for_year(2024)
        .await
        .expect("ranking computed");
    let provinces: Vec<&str> = ranked.iter().map(|s| s.province_id.as_str()).collect();
    assert_eq!(provinces, vec!["31"]);
    // The national aggregate still shapes the peer group range.
    assert_close(ranked[0].composite_score, 100.0);
}

#[tokio::test]
async fn lone_province_takes_rank_one_with_degenerate_scores() {
    let store = store_with(vec![(TPT, tpt("51", 2024, 1.8)), (IPM, ipm("51", 2024, 77.1))]).await;
    let service = build_service(store);

    let ranked = service
        .calculate_all_scores_for_year(2024)
        .await
        .expect("ranking computed");
    assert_eq!(ranked.len(), 1);
    assert_eq!(ranked[0].rank, Some(1));
    assert_close(ranked[0].composite_score, 50.0);
    assert_eq!(ranked[0].province_name, "Bali");
}

#[tokio::test]
async fn empty_year_yields_empty_ranking() {
    let service = build_service(seeded_store().await);
    assert!(service
        .calculate_all_scores_for_year(2099)
        .await
        .expect("ranking computed")
        .is_empty());
}

#[tokio::test]
async fn top_and_bottom_slices() {
    let service = build_service(seeded_store().await);

    let top = service.top(2024, 2).await.expect("top");
    let top_ids: Vec<&str> = top.iter().map(|s| s.province_id.as_str()).collect();
    assert_eq!(top_ids, vec!["31", "32"]);

    let bottom = service.bottom(2024, 2).await.expect("bottom");
    let bottom_ids: Vec<&str> = bottom.iter().map(|s| s.province_id.as_str()).collect();
    assert_eq!(bottom_ids, vec!["33", "34"]);

    let everything = service.bottom(2024, 50).await.expect("bottom");
    assert_eq!(everything.len(), 4);
    assert_eq!(everything[0].rank, Some(4));
}

#[tokio::test]
async fn available_years_span_all_collections() {
    let store = store_with(vec![
        (TPT, tpt("31", 2022, 7.2)),
        (IPM, ipm("31", 2024, 80.0)),
        (GINI, gini("31", 2023, 0.41)),
        ("kependudukan", population("31", 2019, 10_562.1)),
    ])
    .await;
    let service = build_service(store);

    assert_eq!(
        service.available_years().await.expect("years"),
        vec![2022, 2023, 2024]
    );
}

#[tokio::test]
async fn national_statistics_summarise_the_ranking() {
    let service = build_service(seeded_store().await);
    let statistics = service
        .national_statistics(2024)
        .await
        .expect("computed")
        .expect("year has data");

    assert_eq!(statistics.provinces_count, 4);
    assert_close(statistics.median_score, 50.0);
    let leader = statistics.leader.expect("leader");
    assert_eq!(leader.province_id, "31");
    assert_eq!(leader.province_name, "DKI Jakarta");
    assert_eq!(statistics.critical.expect("critical").province_id, "33");
    assert_eq!(statistics.total_population, 60_545_200);

    assert!(service
        .national_statistics(2099)
        .await
        .expect("computed")
        .is_none());
}

#[tokio::test]
async fn population_rounds_each_province_before_summing() {
    let store = store_with(vec![
        (TPT, tpt("31", 2024, 4.0)),
        (TPT, tpt("32", 2024, 6.0)),
        ("kependudukan", population("31", 2024, 0.0006)),
        ("kependudukan", population("32", 2024, 0.0006)),
    ])
    .await;
    let service = build_service(store);

    let statistics = service
        .national_statistics(2024)
        .await
        .expect("computed")
        .expect("year has data");
    assert_eq!(statistics.total_population, 2);
}

#[tokio::test]
async fn rank_movement_compares_with_previous_year() {
    let store = store_with(vec![
        (TPT, tpt("31", 2023, 8.0)),
        (TPT, tpt("32", 2023, 4.0)),
        (TPT, tpt("31", 2024, 4.0)),
        (TPT, tpt("32", 2024, 8.0)),
        (TPT, tpt("33", 2024, 6.0)),
    ])
    .await;
    let service = build_service(store);

    let movement = service.rank_movement(2024).await.expect("movement");
    let rows: Vec<(&str, Option<usize>, Option<i64>)> = movement
        .iter()
        .map(|row| (row.score.province_id.as_str(), row.previous_rank, row.rank_delta))
        .collect();
    assert_eq!(
        rows,
        vec![("31", Some(2), Some(1)), ("33", None, None), ("32", Some(1), Some(-2))]
    );
}

#[test]
fn assign_ranks_keeps_input_order_for_ties() {
    let mut scores = vec![
        crate::scoring::CompositeScore {
            province_id: "35".to_string(),
            province_name: "Jawa Timur".to_string(),
            year: 2024,
            composite_score: 61.5,
            collection_scores: Default::default(),
            collections_scored: 1,
            rank: None,
            calculated_at: chrono::Utc::now(),
        },
        crate::scoring::CompositeScore {
            province_id: "12".to_string(),
            province_name: "Sumatera Utara".to_string(),
            year: 2024,
            composite_score: 61.5,
            collection_scores: Default::default(),
            collections_scored: 1,
            rank: None,
            calculated_at: chrono::Utc::now(),
        },
    ];

    ranking::assign_ranks(&mut scores);
    assert_eq!(scores[0].province_id, "35");
    assert_eq!(scores[1].rank, Some(2));
}
