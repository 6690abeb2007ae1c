use std::sync::Arc;

use tempfile::TempDir;

use onboard_api::catalog::{CatalogColumn, CatalogEngine, PageResult, QuerySpec, SortOrder};
use onboard_api::db::DatabaseManager;

async fn catalog_with(rows: &[(&str, &str, Option<&str>, Option<&str>, Option<&str>)]) -> (TempDir, CatalogEngine) {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("test.db");
    let db = DatabaseManager::open_local(path.to_str().unwrap())
        .await
        .expect("open db");
    db.run_migrations().await.expect("migrations");

    let conn = db.get_connection().await.expect("connection");
    for (code, description, category, sub_category, anatomy) in rows {
        conn.execute(
            "INSERT INTO cpt_data (code, description, category, sub_category, anatomy) \
             VALUES (?, ?, ?, ?, ?)",
            libsql::params![
                *code,
                *description,
                category.map(str::to_string),
                sub_category.map(str::to_string),
                anatomy.map(str::to_string),
            ],
        )
        .await
        .expect("seed row");
    }

    (dir, CatalogEngine::new(Arc::new(db)))
}

#[tokio::test]
async fn facet_counts_exclude_null_and_blank_values() {
    let (_dir, engine) = catalog_with(&[
        ("10001", "first", Some("A"), None, None),
        ("10002", "second", Some("A"), None, None),
        ("10003", "third", Some("B"), None, None),
        ("10004", "fourth", None, None, None),
        ("10005", "fifth", Some(""), None, None),
        ("10006", "sixth", Some("   "), None, None),
    ])
    .await;

    let facets = engine.fetch_facets().await.unwrap();

    let categories: Vec<(String, i64)> = facets
        .categories
        .into_iter()
        .map(|c| (c.value, c.count))
        .collect();
    assert_eq!(categories, vec![("A".to_string(), 2), ("B".to_string(), 1)]);
    assert!(facets.sub_categories.is_empty());
    assert!(facets.anatomies.is_empty());
}

#[tokio::test]
async fn pagination_reports_a_ceiling_page_count() {
    let rows: Vec<(String, String)> = (0..25)
        .map(|i| (format!("2{i:04}"), format!("procedure {i}")))
        .collect();
    let seed: Vec<(&str, &str, Option<&str>, Option<&str>, Option<&str>)> = rows
        .iter()
        .map(|(code, desc)| (code.as_str(), desc.as_str(), None, None, None))
        .collect();
    let (_dir, engine) = catalog_with(&seed).await;

    let page1 = engine.fetch_codes_and_description(1, 10).await.unwrap();
    match page1 {
        PageResult::Found { rows, total_pages } => {
            assert_eq!(rows.len(), 10);
            assert_eq!(total_pages, 3);
        }
        PageResult::Empty { .. } => panic!("expected rows on page 1"),
    }

    let page3 = engine.fetch_codes_and_description(3, 10).await.unwrap();
    match page3 {
        PageResult::Found { rows, total_pages } => {
            assert_eq!(rows.len(), 5);
            assert_eq!(total_pages, 3);
        }
        PageResult::Empty { .. } => panic!("expected rows on the last page"),
    }
}

#[tokio::test]
async fn out_of_range_page_is_empty_but_keeps_the_page_count() {
    let (_dir, engine) = catalog_with(&[
        ("30001", "one", None, None, None),
        ("30002", "two", None, None, None),
    ])
    .await;

    let result = engine.fetch_codes_and_description(5, 10).await.unwrap();
    assert_eq!(result, PageResult::Empty { total_pages: 1 });
}

#[tokio::test]
async fn query_matching_nothing_reports_zero_pages() {
    let (_dir, engine) = catalog_with(&[("30001", "one", None, None, None)]).await;

    let result = engine
        .search_code_or_description("no such thing", 1, 10, SortOrder::Asc)
        .await
        .unwrap();
    assert_eq!(result, PageResult::Empty { total_pages: 0 });
}

#[tokio::test]
async fn search_matches_exact_code_or_description_substring() {
    let (_dir, engine) = catalog_with(&[
        ("29881", "knee arthroscopy", Some("Surgery"), None, Some("Knee")),
        ("99213", "office visit", Some("E/M"), None, None),
        ("12345", "another knee procedure", Some("Surgery"), None, Some("Knee")),
    ])
    .await;

    // Exact code match.
    let by_code = engine
        .search_code_or_description("29881", 1, 10, SortOrder::Asc)
        .await
        .unwrap();
    match by_code {
        PageResult::Found { rows, .. } => {
            assert_eq!(rows.len(), 1);
            assert_eq!(rows[0].code, "29881");
        }
        PageResult::Empty { .. } => panic!("expected an exact code match"),
    }

    // Description substring, sorted by code.
    let by_description = engine
        .search_code_or_description("knee", 1, 10, SortOrder::Asc)
        .await
        .unwrap();
    match by_description {
        PageResult::Found { rows, .. } => {
            let codes: Vec<&str> = rows.iter().map(|r| r.code.as_str()).collect();
            assert_eq!(codes, vec!["12345", "29881"]);
        }
        PageResult::Empty { .. } => panic!("expected substring matches"),
    }

    // A partial code is not an exact match and must not hit via code.
    let partial = engine
        .search_code_or_description("2988", 1, 10, SortOrder::Asc)
        .await
        .unwrap();
    assert_eq!(partial, PageResult::Empty { total_pages: 0 });
}

#[tokio::test]
async fn filter_matches_substrings_of_the_field() {
    let (_dir, engine) = catalog_with(&[
        ("40001", "a", Some("Orthopedic Surgery"), None, None),
        ("40002", "b", Some("General Surgery"), None, None),
        ("40003", "c", Some("Radiology"), None, None),
    ])
    .await;

    let result = engine
        .filter_by_field(CatalogColumn::Category, "Surgery", SortOrder::Asc, 1, 10)
        .await
        .unwrap();

    match result {
        PageResult::Found { rows, total_pages } => {
            assert_eq!(total_pages, 1);
            let categories: Vec<&str> = rows
                .iter()
                .map(|r| r.category.as_deref().unwrap())
                .collect();
            // Sorted by the filtered column.
            assert_eq!(categories, vec!["General Surgery", "Orthopedic Surgery"]);
        }
        PageResult::Empty { .. } => panic!("expected substring matches"),
    }
}

#[tokio::test]
async fn filter_and_search_combine_conjunctively() {
    let (_dir, engine) = catalog_with(&[
        ("50001", "knee arthroscopy", Some("Surgery"), None, None),
        ("50002", "knee x-ray", Some("Radiology"), None, None),
        ("50003", "shoulder repair", Some("Surgery"), None, None),
    ])
    .await;

    let mut spec = QuerySpec::new(1, 10);
    spec.filter = Some((CatalogColumn::Category, "Surgery".to_string()));
    spec.search = Some("knee".to_string());

    let result = engine.fetch_data(&spec).await.unwrap();
    match result {
        PageResult::Found { rows, .. } => {
            assert_eq!(rows.len(), 1);
            assert_eq!(rows[0].code, "50001");
        }
        PageResult::Empty { .. } => panic!("expected the conjunction to match one row"),
    }
}

#[tokio::test]
async fn basic_listing_pages_in_id_order() {
    let (_dir, engine) = catalog_with(&[
        ("60003", "third", None, None, None),
        ("60001", "first", None, None, None),
        ("60002", "second", None, None, None),
    ])
    .await;

    let result = engine.fetch_codes_and_description(1, 2).await.unwrap();
    match result {
        PageResult::Found { rows, total_pages } => {
            assert_eq!(total_pages, 2);
            // Insertion order, by id.
            assert_eq!(rows[0].code, "60003");
            assert_eq!(rows[1].code, "60001");
        }
        PageResult::Empty { .. } => panic!("expected the first page"),
    }
}

#[tokio::test]
async fn descending_sort_reverses_the_order() {
    let (_dir, engine) = catalog_with(&[
        ("70001", "knee one", None, None, None),
        ("70002", "knee two", None, None, None),
    ])
    .await;

    let result = engine
        .search_code_or_description("knee", 1, 10, SortOrder::Desc)
        .await
        .unwrap();
    match result {
        PageResult::Found { rows, .. } => {
            let codes: Vec<&str> = rows.iter().map(|r| r.code.as_str()).collect();
            assert_eq!(codes, vec!["70002", "70001"]);
        }
        PageResult::Empty { .. } => panic!("expected matches"),
    }
}
