//! Behavioural tests for the in-memory backend, which must observe the
//! same repository contracts as the Postgres adapters.

use std::sync::Arc;

use marquee_core::database::infrastructure::memory::{
    InMemoryMovieRepository, InMemoryRatingRepository, MemoryStore,
};
use marquee_core::database::{MovieRepository, RatingRepository};
use marquee_model::{GetAllMoviesOptions, Movie, MovieId, SortField, SortOrder, UserId};

fn repos() -> (InMemoryMovieRepository, InMemoryRatingRepository) {
    let store = MemoryStore::new();
    (
        InMemoryMovieRepository::new(Arc::clone(&store)),
        InMemoryRatingRepository::new(store),
    )
}

fn movie(title: &str, year: i32, genres: &[&str]) -> Movie {
    Movie::new(
        MovieId::new(),
        title,
        year,
        genres.iter().map(|g| g.to_string()).collect(),
    )
}

#[tokio::test]
async fn create_then_get_by_id_round_trips() {
    let (movies, _) = repos();
    let m = movie("The Thing", 1982, &["Horror", "Sci-Fi"]);

    assert!(movies.create(&m).await.unwrap());

    let fetched = movies.get_by_id(m.id, None).await.unwrap().unwrap();
    assert_eq!(fetched.title, "The Thing");
    assert_eq!(fetched.slug, "the-thing-1982");
    assert_eq!(fetched.genres, vec!["Horror", "Sci-Fi"]);
    assert_eq!(fetched.rating, None);
    assert_eq!(fetched.user_rating, None);
}

#[tokio::test]
async fn duplicate_slug_fails_without_side_effects() {
    let (movies, _) = repos();
    assert!(movies.create(&movie("Dune", 2021, &["Sci-Fi"])).await.unwrap());
    assert!(!movies.create(&movie("Dune", 2021, &["Drama"])).await.unwrap());

    let count = movies.count(None, None).await.unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn get_by_slug_finds_the_same_movie() {
    let (movies, _) = repos();
    let m = movie("Blade Runner", 1982, &[]);
    movies.create(&m).await.unwrap();

    let fetched = movies
        .get_by_slug("blade-runner-1982", None)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(fetched.id, m.id);
}

#[tokio::test]
async fn rating_upsert_replaces_never_duplicates() {
    let (movies, ratings) = repos();
    let m = movie("Heat", 1995, &["Crime"]);
    movies.create(&m).await.unwrap();

    let user = UserId::new();
    assert!(ratings.rate_movie(m.id, 3, user).await.unwrap());
    assert!(ratings.rate_movie(m.id, 5, user).await.unwrap());

    assert_eq!(ratings.get_aggregate_rating(m.id).await.unwrap(), Some(5.0));
    let (aggregate, own) = ratings.get_rating_for_user(m.id, user).await.unwrap();
    assert_eq!(aggregate, Some(5.0));
    assert_eq!(own, Some(5));
}

#[tokio::test]
async fn rating_an_unknown_movie_reports_a_miss() {
    let (_, ratings) = repos();
    assert!(!ratings
        .rate_movie(MovieId::new(), 4, UserId::new())
        .await
        .unwrap());
}

#[tokio::test]
async fn aggregate_is_a_one_decimal_mean() {
    let (movies, ratings) = repos();
    let m = movie("Arrival", 2016, &[]);
    movies.create(&m).await.unwrap();

    ratings.rate_movie(m.id, 2, UserId::new()).await.unwrap();
    ratings.rate_movie(m.id, 4, UserId::new()).await.unwrap();
    assert_eq!(ratings.get_aggregate_rating(m.id).await.unwrap(), Some(3.0));

    ratings.rate_movie(m.id, 5, UserId::new()).await.unwrap();
    // {2, 4, 5} -> 3.666... -> 3.7
    assert_eq!(ratings.get_aggregate_rating(m.id).await.unwrap(), Some(3.7));
}

#[tokio::test]
async fn zero_ratings_is_absent_not_zero() {
    let (movies, ratings) = repos();
    let m = movie("Stalker", 1979, &[]);
    movies.create(&m).await.unwrap();

    assert_eq!(ratings.get_aggregate_rating(m.id).await.unwrap(), None);

    let hydrated = movies.get_by_id(m.id, None).await.unwrap().unwrap();
    assert_eq!(hydrated.rating, None);
}

#[tokio::test]
async fn listing_hydrates_caller_scoped_rating() {
    let (movies, ratings) = repos();
    let m = movie("Se7en", 1995, &["Thriller"]);
    movies.create(&m).await.unwrap();

    let me = UserId::new();
    let someone_else = UserId::new();
    ratings.rate_movie(m.id, 2, me).await.unwrap();
    ratings.rate_movie(m.id, 4, someone_else).await.unwrap();

    let mine = movies.get_by_id(m.id, Some(me)).await.unwrap().unwrap();
    assert_eq!(mine.rating, Some(3.0));
    assert_eq!(mine.user_rating, Some(2));

    let anonymous = movies.get_by_id(m.id, None).await.unwrap().unwrap();
    assert_eq!(anonymous.rating, Some(3.0));
    assert_eq!(anonymous.user_rating, None);
}

#[tokio::test]
async fn delete_cascades_to_genres_and_ratings() {
    let (movies, ratings) = repos();
    let m = movie("Alien", 1979, &["Horror"]);
    movies.create(&m).await.unwrap();

    let user = UserId::new();
    ratings.rate_movie(m.id, 5, user).await.unwrap();

    assert!(movies.delete_by_id(m.id).await.unwrap());
    assert!(!movies.exists_by_id(m.id).await.unwrap());
    assert_eq!(ratings.get_aggregate_rating(m.id).await.unwrap(), None);
    assert!(ratings.get_ratings_for_user(user).await.unwrap().is_empty());

    // Deleting again is a miss, not an error.
    assert!(!movies.delete_by_id(m.id).await.unwrap());
}

#[tokio::test]
async fn update_replaces_genres_and_regenerates_slug() {
    let (movies, _) = repos();
    let mut m = movie("Midsommar", 2019, &["Horror"]);
    movies.create(&m).await.unwrap();

    m.title = "Midsommar Director's Cut".into();
    m.genres = vec!["Horror".into(), "Drama".into()];
    m.regenerate_slug();
    assert!(movies.update(&m).await.unwrap());

    let fetched = movies.get_by_id(m.id, None).await.unwrap().unwrap();
    assert_eq!(fetched.title, "Midsommar Director's Cut");
    assert_eq!(fetched.slug, "midsommar-directors-cut-2019");
    assert_eq!(fetched.genres, vec!["Horror", "Drama"]);

    let old_slug = movies.get_by_slug("midsommar-2019", None).await.unwrap();
    assert!(old_slug.is_none());
}

#[tokio::test]
async fn update_to_a_taken_slug_is_rejected() {
    let (movies, _) = repos();
    let alien = movie("Alien", 1979, &[]);
    let mut heat = movie("Heat", 1995, &[]);
    movies.create(&alien).await.unwrap();
    movies.create(&heat).await.unwrap();

    heat.title = "Alien".into();
    heat.year_of_release = 1979;
    heat.regenerate_slug();
    assert!(!movies.update(&heat).await.unwrap());

    // Both movies keep their original identity.
    let survivor = movies.get_by_slug("alien-1979", None).await.unwrap().unwrap();
    assert_eq!(survivor.id, alien.id);
    let untouched = movies.get_by_id(heat.id, None).await.unwrap().unwrap();
    assert_eq!(untouched.slug, "heat-1995");
    assert_eq!(untouched.title, "Heat");
}

#[tokio::test]
async fn update_of_missing_movie_is_a_normal_miss() {
    let (movies, _) = repos();
    let ghost = movie("Ghost", 1990, &[]);
    assert!(!movies.update(&ghost).await.unwrap());
}

#[tokio::test]
async fn pagination_and_sort_contract() {
    let (movies, _) = repos();
    for title in ["B", "A", "C"] {
        movies.create(&movie(title, 2000, &[])).await.unwrap();
    }

    let options = GetAllMoviesOptions {
        page: 2,
        page_size: 1,
        sort_field: Some(SortField::Title),
        sort_order: SortOrder::Ascending,
        ..GetAllMoviesOptions::default()
    };

    let page = movies.get_all(&options).await.unwrap();
    let titles: Vec<&str> = page.iter().map(|m| m.title.as_str()).collect();
    assert_eq!(titles, vec!["B"]);
}

#[tokio::test]
async fn unsorted_listing_pages_in_storage_order() {
    let (movies, _) = repos();
    for title in ["B", "A", "C"] {
        movies.create(&movie(title, 2000, &[])).await.unwrap();
    }

    let options = GetAllMoviesOptions {
        page: 1,
        page_size: 3,
        ..GetAllMoviesOptions::default()
    };

    let page = movies.get_all(&options).await.unwrap();
    let titles: Vec<&str> = page.iter().map(|m| m.title.as_str()).collect();
    assert_eq!(titles, vec!["B", "A", "C"]);
}

#[tokio::test]
async fn descending_year_sort() {
    let (movies, _) = repos();
    movies.create(&movie("Old", 1970, &[])).await.unwrap();
    movies.create(&movie("New", 2020, &[])).await.unwrap();
    movies.create(&movie("Mid", 1995, &[])).await.unwrap();

    let options = GetAllMoviesOptions {
        page: 1,
        page_size: 25,
        sort_field: Some(SortField::YearOfRelease),
        sort_order: SortOrder::Descending,
        ..GetAllMoviesOptions::default()
    };

    let page = movies.get_all(&options).await.unwrap();
    let years: Vec<i32> = page.iter().map(|m| m.year_of_release).collect();
    assert_eq!(years, vec![2020, 1995, 1970]);
}

#[tokio::test]
async fn count_applies_the_same_filters_as_get_all() {
    let (movies, _) = repos();
    movies.create(&movie("Alien", 1979, &[])).await.unwrap();
    movies.create(&movie("Aliens", 1986, &[])).await.unwrap();
    movies.create(&movie("Predator", 1987, &[])).await.unwrap();

    assert_eq!(movies.count(None, None).await.unwrap(), 3);
    assert_eq!(movies.count(Some("Alien"), None).await.unwrap(), 2);
    assert_eq!(movies.count(Some("Alien"), Some(1986)).await.unwrap(), 1);
    assert_eq!(movies.count(None, Some(1990)).await.unwrap(), 0);
}

#[tokio::test]
async fn ratings_listing_joins_movie_identity() {
    let (movies, ratings) = repos();
    let alien = movie("Alien", 1979, &[]);
    let heat = movie("Heat", 1995, &[]);
    movies.create(&alien).await.unwrap();
    movies.create(&heat).await.unwrap();

    let user = UserId::new();
    ratings.rate_movie(alien.id, 5, user).await.unwrap();
    ratings.rate_movie(heat.id, 4, user).await.unwrap();
    ratings
        .rate_movie(heat.id, 1, UserId::new())
        .await
        .unwrap();

    let mut mine = ratings.get_ratings_for_user(user).await.unwrap();
    mine.sort_by(|a, b| a.slug.cmp(&b.slug));
    assert_eq!(mine.len(), 2);
    assert_eq!(mine[0].slug, "alien-1979");
    assert_eq!(mine[0].rating, 5);
    assert_eq!(mine[1].slug, "heat-1995");
    assert_eq!(mine[1].rating, 4);
}

#[tokio::test]
async fn deleting_a_rating_is_idempotent_about_absence() {
    let (movies, ratings) = repos();
    let m = movie("Ran", 1985, &[]);
    movies.create(&m).await.unwrap();

    let user = UserId::new();
    ratings.rate_movie(m.id, 3, user).await.unwrap();
    assert!(ratings.delete_rating(m.id, user).await.unwrap());
    assert!(!ratings.delete_rating(m.id, user).await.unwrap());
    assert_eq!(ratings.get_aggregate_rating(m.id).await.unwrap(), None);
}
