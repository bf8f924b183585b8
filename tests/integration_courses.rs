mod common;

use axum::http::StatusCode;
use common::{BOSTON, TestApp, create_test_bootcamp, create_test_user, setup_test_app};
use devcamper_models::{BootcampId, CourseId, UserRole};
use serde_json::{Value, json};
use sqlx::PgPool;

fn course_body(title: &str, tuition: f64) -> Value {
    json!({
        "title": title,
        "description": "Learn to build full stack applications",
        "weeks": "12",
        "tuition": tuition,
        "minimum_skill": "intermediate",
        "scholarship_available": true
    })
}

async fn average_cost(app: &TestApp, bootcamp: BootcampId) -> Option<f64> {
    let response = app
        .get(&format!("/api/v1/bootcamps/{}", bootcamp), None)
        .await;
    response.body["data"]["average_cost"].as_f64()
}

#[sqlx::test(migrations = "./migrations")]
async fn test_average_cost_follows_course_writes(pool: PgPool) {
    let publisher = create_test_user(&pool, UserRole::Publisher).await;
    let bootcamp = create_test_bootcamp(&pool, publisher.id, "Cost Camp", BOSTON).await;
    let app = setup_test_app(pool).await;
    let uri = format!("/api/v1/bootcamps/{}/courses", bootcamp);

    assert_eq!(average_cost(&app, bootcamp).await, None);

    let first = app
        .post(&uri, Some(&publisher.token), course_body("Front End", 10000.0))
        .await;
    assert_eq!(first.status, StatusCode::CREATED);
    assert_eq!(first.body["data"]["bootcamp_id"], bootcamp.to_string());
    assert_eq!(first.body["data"]["minimum_skill"], "intermediate");
    assert_eq!(average_cost(&app, bootcamp).await, Some(10000.0));

    let second = app
        .post(&uri, Some(&publisher.token), course_body("Back End", 12345.0))
        .await;
    assert_eq!(second.status, StatusCode::CREATED);
    // Mean 11172.5, rounded up to the next ten.
    assert_eq!(average_cost(&app, bootcamp).await, Some(11180.0));

    let second_id = second.body["data"]["id"].as_str().unwrap().to_string();
    let response = app
        .put(
            &format!("/api/v1/courses/{}", second_id),
            Some(&publisher.token),
            json!({"tuition": 14000}),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["title"], "Back End");
    assert_eq!(average_cost(&app, bootcamp).await, Some(12000.0));

    let first_id = first.body["data"]["id"].as_str().unwrap().to_string();
    for id in [first_id, second_id] {
        let response = app
            .delete(&format!("/api/v1/courses/{}", id), Some(&publisher.token))
            .await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body["data"], json!({}));
    }
    assert_eq!(average_cost(&app, bootcamp).await, None);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_course_for_missing_bootcamp(pool: PgPool) {
    let publisher = create_test_user(&pool, UserRole::Publisher).await;
    let app = setup_test_app(pool).await;
    let missing = BootcampId::new();

    let response = app
        .post(
            &format!("/api/v1/bootcamps/{}/courses", missing),
            Some(&publisher.token),
            course_body("Orphan", 100.0),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(
        response.error(),
        format!("Bootcamp not found with id of {}", missing)
    );

    let response = app
        .get(&format!("/api/v1/bootcamps/{}/courses", missing), None)
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_only_owner_manages_courses(pool: PgPool) {
    let owner = create_test_user(&pool, UserRole::Publisher).await;
    let other = create_test_user(&pool, UserRole::Publisher).await;
    let user = create_test_user(&pool, UserRole::User).await;
    let bootcamp = create_test_bootcamp(&pool, owner.id, "Owned Camp", BOSTON).await;
    let app = setup_test_app(pool).await;
    let uri = format!("/api/v1/bootcamps/{}/courses", bootcamp);

    let response = app
        .post(&uri, Some(&other.token), course_body("Intruder", 100.0))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.error(),
        format!(
            "User {} is not authorized to add a course to this bootcamp",
            other.id
        )
    );

    let response = app
        .post(&uri, Some(&user.token), course_body("Intruder", 100.0))
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let created = app
        .post(&uri, Some(&owner.token), course_body("Real Course", 100.0))
        .await;
    let course_uri = format!(
        "/api/v1/courses/{}",
        created.body["data"]["id"].as_str().unwrap()
    );

    let response = app
        .put(&course_uri, Some(&other.token), json!({"title": "Renamed"}))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let response = app.delete(&course_uri, Some(&other.token)).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let response = app.get(&course_uri, None).await;
    assert_eq!(response.body["data"]["title"], "Real Course");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_course_listings(pool: PgPool) {
    let publisher = create_test_user(&pool, UserRole::Publisher).await;
    let bootcamp = create_test_bootcamp(&pool, publisher.id, "Listing Camp", BOSTON).await;
    let app = setup_test_app(pool).await;
    let uri = format!("/api/v1/bootcamps/{}/courses", bootcamp);

    app.post(&uri, Some(&publisher.token), course_body("Cheap", 500.0))
        .await;
    app.post(&uri, Some(&publisher.token), course_body("Pricey", 9000.0))
        .await;

    let response = app.get(&uri, None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["count"], 2);
    assert!(response.body.get("pagination").is_none());

    let response = app
        .get("/api/v1/courses?tuition%5Blte%5D=1000&select=title", None)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["count"], 1);
    let course = &response.body["data"][0];
    assert_eq!(course["title"], "Cheap");
    assert!(course.get("tuition").is_none());
    assert_eq!(course["bootcamp"]["name"], "Listing Camp");
    assert_eq!(course["bootcamp"]["description"], "A test bootcamp");

    let id = course["id"].as_str().unwrap();
    let response = app.get(&format!("/api/v1/courses/{}", id), None).await;
    assert_eq!(response.body["data"]["bootcamp"]["id"], bootcamp.to_string());

    let missing = CourseId::new();
    let response = app.get(&format!("/api/v1/courses/{}", missing), None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(
        response.error(),
        format!("Course not found with id of {}", missing)
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn test_course_validation(pool: PgPool) {
    let publisher = create_test_user(&pool, UserRole::Publisher).await;
    let bootcamp = create_test_bootcamp(&pool, publisher.id, "Strict Camp", BOSTON).await;
    let app = setup_test_app(pool).await;
    let uri = format!("/api/v1/bootcamps/{}/courses", bootcamp);

    let response = app
        .post(&uri, Some(&publisher.token), course_body("Negative", -1.0))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let mut body = course_body("Expert Only", 100.0);
    body["minimum_skill"] = json!("expert");
    let response = app.post(&uri, Some(&publisher.token), body).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}
