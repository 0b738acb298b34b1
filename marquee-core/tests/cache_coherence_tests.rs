//! Cache invalidation protocol: cached reads survive exactly until the
//! next successful mutation, which evicts the whole movies group.

use std::sync::Arc;

use marquee_core::database::{InMemoryCache, MovieDatabase, ResponseCache};
use marquee_model::{GetAllMoviesOptions, Movie, MovieId, UserId};

fn cached_db() -> (MovieDatabase, Arc<InMemoryCache>) {
    let cache = Arc::new(InMemoryCache::new());
    let db = MovieDatabase::in_memory().with_cache(Arc::clone(&cache) as Arc<dyn ResponseCache>);
    (db, cache)
}

fn movie(title: &str, year: i32) -> Movie {
    Movie::new(MovieId::new(), title, year, vec![])
}

fn wide_page() -> GetAllMoviesOptions {
    GetAllMoviesOptions {
        page: 1,
        page_size: 25,
        ..GetAllMoviesOptions::default()
    }
}

#[tokio::test]
async fn listing_reads_are_served_from_cache_until_a_mutation() {
    let (db, cache) = cached_db();
    db.create_movie(&movie("Alien", 1979)).await.unwrap();

    let options = wide_page();
    let first = db.get_all_movies(&options).await.unwrap();
    assert_eq!(first.len(), 1);
    assert_eq!(cache.len(), 1);

    // Mutating through the port (not the facade) leaves the cache alone,
    // proving the next facade read really is the cached response.
    db.movies().create(&movie("Heat", 1995)).await.unwrap();
    let stale = db.get_all_movies(&options).await.unwrap();
    assert_eq!(stale.len(), 1);

    // A facade mutation evicts the group; the next read recomputes.
    db.create_movie(&movie("Ran", 1985)).await.unwrap();
    let fresh = db.get_all_movies(&options).await.unwrap();
    assert_eq!(fresh.len(), 3);
}

#[tokio::test]
async fn single_movie_reads_are_cached_and_evicted() {
    let (db, cache) = cached_db();
    let m = movie("Dune", 2021);
    db.create_movie(&m).await.unwrap();

    db.get_movie_by_id(m.id, None).await.unwrap().unwrap();
    db.get_movie_by_slug("dune-2021", None).await.unwrap().unwrap();
    assert_eq!(cache.len(), 2);

    let mut updated = m.clone();
    updated.title = "Dune: Part One".into();
    updated.regenerate_slug();
    assert!(db.update_movie(&updated).await.unwrap());
    assert!(cache.is_empty());

    let fetched = db.get_movie_by_id(m.id, None).await.unwrap().unwrap();
    assert_eq!(fetched.title, "Dune: Part One");
}

#[tokio::test]
async fn rating_mutations_evict_because_aggregates_change() {
    let (db, cache) = cached_db();
    let m = movie("Arrival", 2016);
    db.create_movie(&m).await.unwrap();

    let user = UserId::new();
    db.rate_movie(m.id, 4, user).await.unwrap();

    let rated = db.get_movie_by_id(m.id, None).await.unwrap().unwrap();
    assert_eq!(rated.rating, Some(4.0));
    assert_eq!(cache.len(), 1);

    db.rate_movie(m.id, 2, UserId::new()).await.unwrap();
    assert!(cache.is_empty());

    let rerated = db.get_movie_by_id(m.id, None).await.unwrap().unwrap();
    assert_eq!(rerated.rating, Some(3.0));

    db.delete_rating(m.id, user).await.unwrap();
    let after_delete = db.get_movie_by_id(m.id, None).await.unwrap().unwrap();
    assert_eq!(after_delete.rating, Some(2.0));
}

#[tokio::test]
async fn failed_mutations_do_not_evict() {
    let (db, cache) = cached_db();
    db.create_movie(&movie("Alien", 1979)).await.unwrap();

    db.get_all_movies(&wide_page()).await.unwrap();
    assert_eq!(cache.len(), 1);

    // Slug conflict: a failed create leaves the cache untouched.
    assert!(!db.create_movie(&movie("Alien", 1979)).await.unwrap());
    assert_eq!(cache.len(), 1);

    // Updating a missing movie is a miss, not a mutation.
    assert!(!db.update_movie(&movie("Ghost", 1990)).await.unwrap());
    assert_eq!(cache.len(), 1);

    assert!(!db.delete_movie(MovieId::new()).await.unwrap());
    assert_eq!(cache.len(), 1);
}

#[tokio::test]
async fn user_scoped_reads_never_share_cache_entries() {
    let (db, _cache) = cached_db();
    let m = movie("Se7en", 1995);
    db.create_movie(&m).await.unwrap();

    let me = UserId::new();
    db.rate_movie(m.id, 5, me).await.unwrap();

    let mine = db.get_movie_by_id(m.id, Some(me)).await.unwrap().unwrap();
    assert_eq!(mine.user_rating, Some(5));

    // The anonymous read must not pick up the user-scoped cached entry.
    let anonymous = db.get_movie_by_id(m.id, None).await.unwrap().unwrap();
    assert_eq!(anonymous.user_rating, None);

    let stranger = db
        .get_movie_by_id(m.id, Some(UserId::new()))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stranger.user_rating, None);
}

#[tokio::test]
async fn uncached_facade_still_serves_reads() {
    let db = MovieDatabase::in_memory();
    let m = movie("Stalker", 1979);
    db.create_movie(&m).await.unwrap();

    let fetched = db.get_movie_by_id(m.id, None).await.unwrap().unwrap();
    assert_eq!(fetched.title, "Stalker");
    assert_eq!(db.count_movies(None, None).await.unwrap(), 1);
}
