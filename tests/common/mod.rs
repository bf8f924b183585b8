#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode, header};
use devcamper::router::init_router;
use devcamper::state::AppState;
use devcamper::utils::email::{MailError, Mailer};
use devcamper::utils::geocoder::{GeocodeError, Geocoder};
use devcamper_auth::create_token;
use devcamper_config::{
    AppConfig, CorsConfig, DatabaseConfig, EmailConfig, Environment, GeocoderConfig, JwtConfig,
    ServerConfig, UploadConfig,
};
use devcamper_core::BoxFuture;
use devcamper_core::file_storage::LocalFileStorage;
use devcamper_core::hash_password;
use devcamper_models::{BootcampId, Location, UserId, UserRole};
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

pub const TEST_SECRET: &str = "test_secret_key_for_testing_purposes";
pub const TEST_PASSWORD: &str = "testpass123";
pub const TEST_BASE_URL: &str = "http://localhost:5000";
pub const MAX_UPLOAD: usize = 1024;

/// Zipcode the stub geocoder cannot resolve.
pub const UNKNOWN_ZIPCODE: &str = "00000";

pub const BOSTON: (f64, f64) = (42.350103, -71.103116);
pub const PROVIDENCE: (f64, f64) = (41.824, -71.4128);
pub const NEW_YORK: (f64, f64) = (40.7506, -73.9971);

/// Resolves everything to Boston, except addresses mentioning Providence or
/// New York and [`UNKNOWN_ZIPCODE`].
pub struct StubGeocoder;

impl Geocoder for StubGeocoder {
    fn geocode<'a>(&'a self, address: &'a str) -> BoxFuture<'a, Result<Location, GeocodeError>> {
        Box::pin(async move {
            if address.contains(UNKNOWN_ZIPCODE) {
                return Err(GeocodeError::NotFound(address.to_string()));
            }

            let (city, state, zipcode, (lat, lng)) = if address.contains("Providence") {
                ("Providence", "RI", "02903", PROVIDENCE)
            } else if address.contains("New York") || address.contains("10001") {
                ("New York", "NY", "10001", NEW_YORK)
            } else {
                ("Boston", "MA", "02215", BOSTON)
            };

            Ok(Location {
                latitude: Some(lat),
                longitude: Some(lng),
                formatted_address: Some(format!("{}, {} {}, US", city, state, zipcode)),
                street: Some("1 Main St".to_string()),
                city: Some(city.to_string()),
                state: Some(state.to_string()),
                zipcode: Some(zipcode.to_string()),
                country: Some("US".to_string()),
            })
        })
    }
}

#[derive(Debug, Clone)]
pub struct SentMail {
    pub to: String,
    pub reset_url: String,
}

#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<SentMail>>,
}

impl RecordingMailer {
    pub fn last_reset_token(&self) -> Option<String> {
        self.sent
            .lock()
            .unwrap()
            .last()
            .and_then(|mail| mail.reset_url.rsplit('/').next().map(str::to_string))
    }
}

impl Mailer for RecordingMailer {
    fn send_password_reset<'a>(
        &'a self,
        to_email: &'a str,
        _to_name: &'a str,
        reset_url: &'a str,
    ) -> BoxFuture<'a, Result<(), MailError>> {
        Box::pin(async move {
            self.sent.lock().unwrap().push(SentMail {
                to: to_email.to_string(),
                reset_url: reset_url.to_string(),
            });
            Ok(())
        })
    }
}

/// Always fails, as an unreachable SMTP server would.
pub struct FailingMailer;

impl Mailer for FailingMailer {
    fn send_password_reset<'a>(
        &'a self,
        _to_email: &'a str,
        _to_name: &'a str,
        _reset_url: &'a str,
    ) -> BoxFuture<'a, Result<(), MailError>> {
        Box::pin(async move {
            let err = "not an address".parse::<lettre::Address>().unwrap_err();
            Err(MailError::Address(err))
        })
    }
}

pub fn test_config(upload_dir: PathBuf) -> AppConfig {
    AppConfig {
        server: ServerConfig {
            port: 0,
            environment: Environment::Test,
            base_url: TEST_BASE_URL.to_string(),
        },
        database: DatabaseConfig {
            url: String::new(),
            max_connections: 5,
        },
        jwt: JwtConfig::with_secret(TEST_SECRET),
        email: EmailConfig {
            enabled: false,
            smtp_host: "localhost".to_string(),
            smtp_port: 1025,
            smtp_username: String::new(),
            smtp_password: String::new(),
            from_email: "noreply@devcamper.io".to_string(),
            from_name: "DevCamper".to_string(),
        },
        cors: CorsConfig {
            allowed_origins: vec!["http://localhost:3000".to_string()],
        },
        upload: UploadConfig {
            dir: upload_dir,
            public_path: "/uploads".to_string(),
            max_file_size: MAX_UPLOAD,
        },
        geocoder: GeocoderConfig {
            provider: "stub".to_string(),
            api_key: String::new(),
            base_url: String::new(),
        },
    }
}

pub struct TestApp {
    pub router: Router,
    pub db: PgPool,
    pub mailer: Arc<RecordingMailer>,
    pub upload_dir: PathBuf,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    pub fn error(&self) -> &str {
        self.body["error"].as_str().unwrap_or_default()
    }

    /// Value of the `token` cookie set by the response, if any.
    pub fn token_cookie(&self) -> Option<String> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find(|v| v.starts_with("token="))
            .map(str::to_string)
    }
}

pub async fn setup_test_app(pool: PgPool) -> TestApp {
    let mailer = Arc::new(RecordingMailer::default());
    setup_test_app_with_mailer(pool, mailer.clone(), mailer).await
}

pub async fn setup_test_app_with_mailer(
    pool: PgPool,
    mailer: Arc<dyn Mailer>,
    recorder: Arc<RecordingMailer>,
) -> TestApp {
    let upload_dir = std::env::temp_dir().join(format!("devcamper-test-{}", Uuid::new_v4()));
    std::fs::create_dir_all(&upload_dir).unwrap();

    let config = test_config(upload_dir.clone());
    let storage = LocalFileStorage::new(upload_dir.clone(), config.upload.max_file_size);

    let state = AppState {
        db: pool.clone(),
        config: Arc::new(config),
        mailer,
        geocoder: Arc::new(StubGeocoder),
        storage: Arc::new(storage),
    };

    TestApp {
        router: init_router(state),
        db: pool,
        mailer: recorder,
        upload_dir,
    }
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.send(json_request("GET", uri, token, None)).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.send(json_request("POST", uri, token, Some(body))).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.send(json_request("PUT", uri, token, Some(body))).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.send(json_request("DELETE", uri, token, None)).await
    }
}

pub fn json_request(
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub struct TestUser {
    pub id: UserId,
    pub email: String,
    pub password: String,
    pub token: String,
}

pub fn generate_unique_email() -> String {
    format!("test-{}@test.com", Uuid::new_v4())
}

pub fn token_for(id: UserId) -> String {
    create_token(id.into_inner(), &JwtConfig::with_secret(TEST_SECRET)).unwrap()
}

pub async fn create_test_user(pool: &PgPool, role: UserRole) -> TestUser {
    let email = generate_unique_email();
    let hashed = hash_password(TEST_PASSWORD).unwrap();

    let id: UserId = sqlx::query_scalar(
        "INSERT INTO users (name, email, role, password) VALUES ($1, $2, $3, $4) RETURNING id",
    )
    .bind("Test User")
    .bind(&email)
    .bind(role)
    .bind(&hashed)
    .fetch_one(pool)
    .await
    .unwrap();

    TestUser {
        id,
        email,
        password: TEST_PASSWORD.to_string(),
        token: token_for(id),
    }
}

/// Inserts a bootcamp directly, located at `(lat, lng)`.
pub async fn create_test_bootcamp(
    pool: &PgPool,
    owner: UserId,
    name: &str,
    (lat, lng): (f64, f64),
) -> BootcampId {
    sqlx::query_scalar(
        "INSERT INTO bootcamps (user_id, name, slug, description, address, latitude, longitude, careers)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
         RETURNING id",
    )
    .bind(owner)
    .bind(name)
    .bind(devcamper_models::generate_slug(name))
    .bind("A test bootcamp")
    .bind("1 Main St")
    .bind(lat)
    .bind(lng)
    .bind(vec!["Web Development".to_string()])
    .fetch_one(pool)
    .await
    .unwrap()
}
