//! Shared test harness for storage backend testing
//!
//! Provides ingredient fixtures and query-option helpers for the
//! `data_service_tests!` conformance suite.
//!
//! # Usage
//!
//! From any integration test file in `tests/`:
//! ```rust,ignore
//! #[macro_use]
//! mod storage_harness;
//! use storage_harness::*;
//! ```

#![allow(dead_code)]

#[macro_use]
pub mod data_service_tests;

use recipe_api::core::query::{QueryOptions, SortDirection, SortSpec};
use recipe_api::entities::{Category, Ingredient};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// An ingredient with a random id and the current timestamps
pub fn ingredient(name: &str, category: Category) -> Ingredient {
    Ingredient::new(name, format!("{} for testing", name), category)
}

/// An ingredient with a fixed id
pub fn ingredient_with_id(id: Uuid, name: &str) -> Ingredient {
    let mut ingredient = ingredient(name, Category::Other);
    ingredient.id = id;
    ingredient
}

/// `n` ingredients named `Item_00`, `Item_01`, ... (zero-padded so byte order
/// equals numeric order)
pub fn sample_batch(n: usize) -> Vec<Ingredient> {
    (0..n)
        .map(|i| {
            let category = if i % 2 == 0 {
                Category::Vegetable
            } else {
                Category::Fruit
            };
            ingredient(&format!("Item_{:02}", i), category)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Query option helpers
// ---------------------------------------------------------------------------

pub fn all() -> QueryOptions {
    QueryOptions::default()
}

pub fn sorted_by(field: &str, direction: SortDirection) -> QueryOptions {
    QueryOptions {
        sort: Some(SortSpec {
            field: field.to_string(),
            direction,
        }),
        ..QueryOptions::default()
    }
}

pub fn page_of(skip: u64, limit: u64) -> QueryOptions {
    QueryOptions {
        skip: Some(skip),
        limit: Some(limit),
        ..sorted_by("name", SortDirection::Asc)
    }
}

pub fn searching(term: &str) -> QueryOptions {
    QueryOptions {
        search: Some(term.to_string()),
        ..sorted_by("name", SortDirection::Asc)
    }
}

// ---------------------------------------------------------------------------
// Assertion helpers
// ---------------------------------------------------------------------------

pub fn names(list: &[Ingredient]) -> Vec<&str> {
    list.iter().map(|i| i.name.as_str()).collect()
}

pub fn assert_count<T>(list: &[T], expected: usize) {
    assert_eq!(
        list.len(),
        expected,
        "Expected {} items, got {}",
        expected,
        list.len()
    );
}
