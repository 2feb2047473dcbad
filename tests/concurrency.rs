//! Concurrency Integration Tests
//!
//! Many tasks hitting one catalog through an `Arc`.

use std::sync::Arc;

use streamcat::{AgeRating, Catalog, ContentKind, NewContent, UserId};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_parallel_ratings_are_not_lost() {
    let catalog = Arc::new(Catalog::default());
    let id = catalog
        .add_content(NewContent::new("Crowd Pleaser", ContentKind::Movie, 99, AgeRating::General))
        .unwrap();

    let mut handles = Vec::new();
    for user in 1..=200u64 {
        let catalog = Arc::clone(&catalog);
        handles.push(tokio::spawn(async move {
            // Scores 1..=10, each used by 20 users
            let score = (user % 10 + 1).to_string();
            catalog.rate(id, UserId(user), &score).unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let item = catalog.get_by_id(id).unwrap();
    assert_eq!(item.rating_count(), 200);
    assert!((item.average_rating() - 5.5).abs() < 1e-9);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_parallel_overwrites_keep_one_entry() {
    let catalog = Arc::new(Catalog::default());
    let id = catalog
        .add_content(NewContent::new("Indecisive", ContentKind::Podcast, 35, AgeRating::General))
        .unwrap();

    let mut handles = Vec::new();
    for round in 0..50 {
        let catalog = Arc::clone(&catalog);
        handles.push(tokio::spawn(async move {
            catalog.rate(id, UserId(1), "4").unwrap();
            catalog.rate(id, UserId(2), if round % 2 == 0 { "6" } else { "8" }).unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let item = catalog.get_by_id(id).unwrap();
    assert_eq!(item.rating_count(), 2);

    // Whatever order won, the cached mean matches the final entries
    let entries = item.ratings.entries();
    let mean = entries.iter().map(|(_, s)| s).sum::<f64>() / entries.len() as f64;
    assert_eq!(item.average_rating(), mean);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_parallel_adds_get_unique_ids() {
    let catalog = Arc::new(Catalog::default());

    let mut handles = Vec::new();
    for n in 0..100 {
        let catalog = Arc::clone(&catalog);
        handles.push(tokio::spawn(async move {
            let kind = if n % 2 == 0 { ContentKind::Music } else { ContentKind::Series };
            let request = NewContent::new(format!("Item {}", n), kind, 10 + n, AgeRating::General);
            catalog.add_content(request).unwrap()
        }));
    }

    let mut ids = Vec::new();
    for handle in handles {
        ids.push(handle.await.unwrap().get());
    }
    ids.sort_unstable();

    assert_eq!(ids, (1..=100).collect::<Vec<u64>>());
    assert_eq!(catalog.list_all().len(), 100);
}
