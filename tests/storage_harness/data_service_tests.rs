//! Macro-generated test suite for `DataService<Ingredient>` contract validation.
//!
//! The `data_service_tests!` macro generates a test module that validates any
//! `DataService<Ingredient>` implementation against the full contract: CRUD,
//! case-insensitive search, sorting, skip/limit slicing, counting and
//! concurrent access.
//!
//! # Usage
//!
//! ```rust,ignore
//! #[macro_use]
//! mod storage_harness;
//!
//! use storage_harness::*;
//! use recipe_api::storage::InMemoryDataService;
//!
//! data_service_tests!(InMemoryDataService::<Ingredient>::new());
//! ```
//!
//! # Generated Tests
//!
//! ## CRUD
//! - `test_create_and_find_by_id`
//! - `test_find_one_nonexistent`
//! - `test_find_one_by_field`
//! - `test_find_empty`
//! - `test_update_existing` / `test_update_nonexistent`
//! - `test_delete_existing` / `test_delete_nonexistent`
//!
//! ## Queries
//! - `test_sort_ascending` / `test_sort_descending`
//! - `test_sort_by_created_at_is_chronological`
//! - `test_skip_and_limit` / `test_skip_past_end`
//! - `test_search_is_case_insensitive`
//! - `test_search_accepts_regex` / `test_invalid_regex_matches_literally`
//! - `test_count_with_and_without_search`
//!
//! ## Edge Cases
//! - `test_create_duplicate_id`
//! - `test_concurrent_access`

/// Generate a full `DataService<Ingredient>` conformance test suite.
///
/// `$factory` must evaluate to a service implementing `DataService<Ingredient>`.
/// It is re-evaluated for each test. For the concurrent access test the
/// service must also be `Clone + 'static`.
#[macro_export]
macro_rules! data_service_tests {
    ($factory:expr) => {
        mod data_service_contract_tests {
            use super::*;
            use recipe_api::core::entity::{Entity, Lookup};
            use recipe_api::core::query::SortDirection;
            use recipe_api::core::service::DataService;
            use recipe_api::entities::{Category, Ingredient};
            use uuid::Uuid;

            async fn seed<S: DataService<Ingredient>>(service: &S, items: Vec<Ingredient>) {
                for item in items {
                    service.create(item).await.unwrap();
                }
            }

            // ==================================================================
            // CRUD
            // ==================================================================

            #[tokio::test]
            async fn test_create_and_find_by_id() {
                let service = $factory;
                let egg = ingredient("Egg", Category::Protein);
                let id = egg.id;

                let created = service.create(egg.clone()).await.unwrap();
                assert_eq!(created.id(), id);

                let found = service.find_one(&Lookup::ById(id)).await.unwrap();
                let found = found.expect("record should exist after create");
                assert_eq!(found.name, "Egg");
                assert_eq!(found.category, Category::Protein);
                assert_eq!(found.description, egg.description);
                assert_eq!(
                    found.created_at.timestamp_millis(),
                    egg.created_at.timestamp_millis()
                );
            }

            #[tokio::test]
            async fn test_find_one_nonexistent() {
                let service = $factory;
                let found = service.find_one(&Lookup::ById(Uuid::new_v4())).await.unwrap();
                assert!(found.is_none());
            }

            #[tokio::test]
            async fn test_find_one_by_field() {
                let service = $factory;
                seed(&service, sample_batch(3)).await;

                let found = service
                    .find_one(&Lookup::by_field("name", "Item_01"))
                    .await
                    .unwrap()
                    .expect("Item_01 should be found by name");
                assert_eq!(found.category, Category::Fruit);

                let missing = service
                    .find_one(&Lookup::by_field("name", "item_01"))
                    .await
                    .unwrap();
                assert!(missing.is_none(), "field lookups are exact");
            }

            #[tokio::test]
            async fn test_find_empty() {
                let service = $factory;
                let found = service.find(&all()).await.unwrap();
                assert!(found.is_empty());
                assert_eq!(service.count(None).await.unwrap(), 0);
            }

            #[tokio::test]
            async fn test_update_existing() {
                let service = $factory;
                let mut flour = service
                    .create(ingredient("Flour", Category::Grain))
                    .await
                    .unwrap();
                let id = flour.id;

                flour.name = "Rye Flour".to_string();
                flour.touch();
                let updated = service.update(&id, flour).await.unwrap();
                assert_eq!(updated.map(|i| i.name), Some("Rye Flour".to_string()));

                let stored = service.find_one(&Lookup::ById(id)).await.unwrap().unwrap();
                assert_eq!(stored.name, "Rye Flour");
                assert_eq!(service.count(None).await.unwrap(), 1);
            }

            #[tokio::test]
            async fn test_update_nonexistent() {
                let service = $factory;
                let ghost = ingredient("Ghost", Category::Other);
                let id = ghost.id;
                let result = service.update(&id, ghost).await.unwrap();
                assert!(result.is_none());
                assert_eq!(service.count(None).await.unwrap(), 0);
            }

            #[tokio::test]
            async fn test_delete_existing() {
                let service = $factory;
                let milk = service
                    .create(ingredient("Milk", Category::Dairy))
                    .await
                    .unwrap();

                let removed = service.delete(&milk.id).await.unwrap();
                assert_eq!(removed.map(|i| i.id), Some(milk.id));
                assert!(service
                    .find_one(&Lookup::ById(milk.id))
                    .await
                    .unwrap()
                    .is_none());
            }

            #[tokio::test]
            async fn test_delete_nonexistent() {
                let service = $factory;
                let removed = service.delete(&Uuid::new_v4()).await.unwrap();
                assert!(removed.is_none());
            }

            // ==================================================================
            // Sorting and slicing
            // ==================================================================

            #[tokio::test]
            async fn test_sort_ascending() {
                let service = $factory;
                let mut batch = sample_batch(4);
                batch.reverse();
                seed(&service, batch).await;

                let found = service
                    .find(&sorted_by("name", SortDirection::Asc))
                    .await
                    .unwrap();
                assert_eq!(names(&found), vec!["Item_00", "Item_01", "Item_02", "Item_03"]);
            }

            #[tokio::test]
            async fn test_sort_descending() {
                let service = $factory;
                seed(&service, sample_batch(4)).await;

                let found = service
                    .find(&sorted_by("name", SortDirection::Desc))
                    .await
                    .unwrap();
                assert_eq!(names(&found), vec!["Item_03", "Item_02", "Item_01", "Item_00"]);
            }

            #[tokio::test]
            async fn test_sort_by_created_at_is_chronological() {
                let service = $factory;
                let base: chrono::DateTime<chrono::Utc> = "2024-01-01T10:00:00Z".parse().unwrap();
                let mut batch = sample_batch(3);
                for (i, item) in batch.iter_mut().enumerate() {
                    // whole second first, then .500 and 1.000
                    item.created_at = base + chrono::Duration::milliseconds(500 * i as i64);
                }
                batch.reverse();
                seed(&service, batch).await;

                let found = service
                    .find(&sorted_by("createdAt", SortDirection::Asc))
                    .await
                    .unwrap();
                assert_eq!(names(&found), vec!["Item_00", "Item_01", "Item_02"]);

                let found = service
                    .find(&sorted_by("createdAt", SortDirection::Desc))
                    .await
                    .unwrap();
                assert_eq!(names(&found), vec!["Item_02", "Item_01", "Item_00"]);
            }

            #[tokio::test]
            async fn test_skip_and_limit() {
                let service = $factory;
                seed(&service, sample_batch(25)).await;

                let second = service.find(&page_of(10, 10)).await.unwrap();
                assert_count(&second, 10);
                assert_eq!(second[0].name, "Item_10");
                assert_eq!(second[9].name, "Item_19");

                let last = service.find(&page_of(20, 10)).await.unwrap();
                assert_count(&last, 5);
                assert_eq!(last[4].name, "Item_24");
            }

            #[tokio::test]
            async fn test_skip_past_end() {
                let service = $factory;
                seed(&service, sample_batch(3)).await;

                let found = service.find(&page_of(30, 10)).await.unwrap();
                assert!(found.is_empty());
            }

            // ==================================================================
            // Search and count
            // ==================================================================

            #[tokio::test]
            async fn test_search_is_case_insensitive() {
                let service = $factory;
                seed(
                    &service,
                    vec![
                        ingredient("Egg", Category::Protein),
                        ingredient("Eggplant", Category::Vegetable),
                        ingredient("Basil", Category::Vegetable),
                    ],
                )
                .await;

                let found = service.find(&searching("EGG")).await.unwrap();
                assert_eq!(names(&found), vec!["Egg", "Eggplant"]);
            }

            #[tokio::test]
            async fn test_search_accepts_regex() {
                let service = $factory;
                seed(&service, sample_batch(12)).await;

                let found = service.find(&searching("^item_1")).await.unwrap();
                assert_eq!(names(&found), vec!["Item_10", "Item_11"]);
            }

            #[tokio::test]
            async fn test_invalid_regex_matches_literally() {
                let service = $factory;
                seed(
                    &service,
                    vec![
                        ingredient("Salt (coarse)", Category::Other),
                        ingredient("Salt", Category::Other),
                    ],
                )
                .await;

                let found = service.find(&searching("(coarse")).await.unwrap();
                assert_eq!(names(&found), vec!["Salt (coarse)"]);
            }

            #[tokio::test]
            async fn test_count_with_and_without_search() {
                let service = $factory;
                seed(&service, sample_batch(12)).await;

                assert_eq!(service.count(None).await.unwrap(), 12);
                assert_eq!(service.count(Some("item_0")).await.unwrap(), 10);
                assert_eq!(service.count(Some("nothing")).await.unwrap(), 0);
            }

            // ==================================================================
            // Edge cases
            // ==================================================================

            #[tokio::test]
            async fn test_create_duplicate_id() {
                let service = $factory;
                let id = Uuid::new_v4();

                service.create(ingredient_with_id(id, "First")).await.unwrap();
                let second = service.create(ingredient_with_id(id, "Second")).await;
                assert!(second.is_err(), "ids are unique");

                let stored = service.find_one(&Lookup::ById(id)).await.unwrap().unwrap();
                assert_eq!(stored.name, "First");
            }

            #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
            async fn test_concurrent_access() {
                let service = $factory;
                let s1 = service.clone();
                let s2 = service.clone();

                let a = ingredient("Concurrent_A", Category::Other);
                let b = ingredient("Concurrent_B", Category::Other);
                let (id_a, id_b) = (a.id, b.id);

                let h1 = tokio::spawn(async move { s1.create(a).await });
                let h2 = tokio::spawn(async move { s2.create(b).await });

                let (r1, r2) = tokio::time::timeout(std::time::Duration::from_secs(30), async {
                    tokio::try_join!(h1, h2).unwrap()
                })
                .await
                .expect("concurrent creates timed out");
                r1.unwrap();
                r2.unwrap();

                let found = service.find(&all()).await.unwrap();
                assert_count(&found, 2);
                let ids: Vec<Uuid> = found.iter().map(|i| i.id()).collect();
                assert!(ids.contains(&id_a));
                assert!(ids.contains(&id_b));
            }
        }
    };
}
