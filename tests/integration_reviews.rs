mod common;

use axum::http::StatusCode;
use common::{BOSTON, TestApp, create_test_bootcamp, create_test_user, setup_test_app};
use devcamper_models::{BootcampId, ReviewId, UserRole};
use serde_json::{Value, json};
use sqlx::PgPool;

fn review_body(rating: i32) -> Value {
    json!({
        "title": "Great bootcamp",
        "text": "Learned a lot in a short time",
        "rating": rating
    })
}

async fn average_rating(app: &TestApp, bootcamp: BootcampId) -> Option<f64> {
    let response = app
        .get(&format!("/api/v1/bootcamps/{}", bootcamp), None)
        .await;
    response.body["data"]["average_rating"].as_f64()
}

#[sqlx::test(migrations = "./migrations")]
async fn test_average_rating_follows_review_writes(pool: PgPool) {
    let publisher = create_test_user(&pool, UserRole::Publisher).await;
    let bootcamp = create_test_bootcamp(&pool, publisher.id, "Rated Camp", BOSTON).await;
    let mut reviewers = Vec::new();
    for _ in 0..3 {
        reviewers.push(create_test_user(&pool, UserRole::User).await);
    }
    let app = setup_test_app(pool).await;
    let uri = format!("/api/v1/bootcamps/{}/reviews", bootcamp);

    let mut review_ids = Vec::new();
    for (reviewer, rating) in reviewers.iter().zip([4, 6, 8]) {
        let response = app
            .post(&uri, Some(&reviewer.token), review_body(rating))
            .await;
        assert_eq!(response.status, StatusCode::CREATED);
        assert_eq!(response.body["data"]["user_id"], reviewer.id.to_string());
        review_ids.push(response.body["data"]["id"].as_str().unwrap().to_string());
    }
    assert_eq!(average_rating(&app, bootcamp).await, Some(6.0));

    let response = app
        .put(
            &format!("/api/v1/reviews/{}", review_ids[0]),
            Some(&reviewers[0].token),
            json!({"rating": 10}),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["title"], "Great bootcamp");
    assert_eq!(average_rating(&app, bootcamp).await, Some(8.0));

    for (reviewer, id) in reviewers.iter().zip(&review_ids) {
        let response = app
            .delete(&format!("/api/v1/reviews/{}", id), Some(&reviewer.token))
            .await;
        assert_eq!(response.status, StatusCode::OK);
    }
    assert_eq!(average_rating(&app, bootcamp).await, None);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_one_review_per_user_per_bootcamp(pool: PgPool) {
    let publisher = create_test_user(&pool, UserRole::Publisher).await;
    let reviewer = create_test_user(&pool, UserRole::User).await;
    let first = create_test_bootcamp(&pool, publisher.id, "First Camp", BOSTON).await;
    let second = create_test_bootcamp(&pool, publisher.id, "Second Camp", BOSTON).await;
    let app = setup_test_app(pool).await;

    let uri = format!("/api/v1/bootcamps/{}/reviews", first);
    let response = app.post(&uri, Some(&reviewer.token), review_body(7)).await;
    assert_eq!(response.status, StatusCode::CREATED);

    let response = app.post(&uri, Some(&reviewer.token), review_body(2)).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error(), "You have already reviewed this bootcamp");
    assert_eq!(average_rating(&app, first).await, Some(7.0));

    let response = app
        .post(
            &format!("/api/v1/bootcamps/{}/reviews", second),
            Some(&reviewer.token),
            review_body(3),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_publishers_cannot_review(pool: PgPool) {
    let publisher = create_test_user(&pool, UserRole::Publisher).await;
    let bootcamp = create_test_bootcamp(&pool, publisher.id, "Own Camp", BOSTON).await;
    let app = setup_test_app(pool).await;

    let response = app
        .post(
            &format!("/api/v1/bootcamps/{}/reviews", bootcamp),
            Some(&publisher.token),
            review_body(10),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(
        response.error(),
        "User role 'publisher' is not authorized to access this route"
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn test_only_author_or_admin_changes_review(pool: PgPool) {
    let publisher = create_test_user(&pool, UserRole::Publisher).await;
    let author = create_test_user(&pool, UserRole::User).await;
    let stranger = create_test_user(&pool, UserRole::User).await;
    let admin = create_test_user(&pool, UserRole::Admin).await;
    let bootcamp = create_test_bootcamp(&pool, publisher.id, "Guarded Camp", BOSTON).await;
    let app = setup_test_app(pool).await;

    let created = app
        .post(
            &format!("/api/v1/bootcamps/{}/reviews", bootcamp),
            Some(&author.token),
            review_body(5),
        )
        .await;
    let review_uri = format!(
        "/api/v1/reviews/{}",
        created.body["data"]["id"].as_str().unwrap()
    );

    let response = app
        .put(&review_uri, Some(&stranger.token), json!({"rating": 1}))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.error(),
        format!("User {} is not authorized to update this review", stranger.id)
    );

    let response = app.get(&review_uri, None).await;
    assert_eq!(response.body["data"]["rating"], 5);
    assert_eq!(response.body["data"]["bootcamp"]["name"], "Guarded Camp");

    let response = app
        .put(&review_uri, Some(&admin.token), json!({"text": "Edited by moderator"}))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["text"], "Edited by moderator");

    let response = app.delete(&review_uri, Some(&admin.token)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(average_rating(&app, bootcamp).await, None);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_review_listings_and_lookup(pool: PgPool) {
    let publisher = create_test_user(&pool, UserRole::Publisher).await;
    let reviewer = create_test_user(&pool, UserRole::User).await;
    let bootcamp = create_test_bootcamp(&pool, publisher.id, "Listed Camp", BOSTON).await;
    let app = setup_test_app(pool).await;

    app.post(
        &format!("/api/v1/bootcamps/{}/reviews", bootcamp),
        Some(&reviewer.token),
        review_body(9),
    )
    .await;

    let response = app
        .get(&format!("/api/v1/bootcamps/{}/reviews", bootcamp), None)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["count"], 1);

    let response = app.get("/api/v1/reviews?rating%5Bgte%5D=8", None).await;
    assert_eq!(response.body["count"], 1);
    assert_eq!(response.body["data"][0]["bootcamp"]["name"], "Listed Camp");

    let response = app.get("/api/v1/reviews?rating%5Bgte%5D=10", None).await;
    assert_eq!(response.body["count"], 0);

    let missing = ReviewId::new();
    let response = app.get(&format!("/api/v1/reviews/{}", missing), None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(
        response.error(),
        format!("Review not found with id of {}", missing)
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn test_rating_out_of_range(pool: PgPool) {
    let publisher = create_test_user(&pool, UserRole::Publisher).await;
    let reviewer = create_test_user(&pool, UserRole::User).await;
    let bootcamp = create_test_bootcamp(&pool, publisher.id, "Strict Camp", BOSTON).await;
    let app = setup_test_app(pool).await;
    let uri = format!("/api/v1/bootcamps/{}/reviews", bootcamp);

    for rating in [0, 11] {
        let response = app
            .post(&uri, Some(&reviewer.token), review_body(rating))
            .await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.error(), "Please add a rating between 1 and 10");
    }
}
