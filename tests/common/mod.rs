use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use chrono::NaiveDate;
use hrms::{
    config::Config,
    db::create_pool,
    models::{CreateEmployee, Employee, EmployeeStatus},
    repositories::{EmployeeRepository, RoleRepository, UserRepository},
    services::PermissionService,
    AppState,
};
use serde_json::{json, Value};
use sqlx::PgPool;
use tower::util::ServiceExt;
use uuid::Uuid;

/// Connects, migrates and seeds the default roles. Returns `None` when
/// `DATABASE_URL` is unset so database-backed tests can skip.
pub async fn setup_test_db() -> Option<PgPool> {
    dotenvy::dotenv().ok();
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set; skipping database-backed test");
        return None;
    };

    let pool = create_pool(&database_url, 5)
        .await
        .expect("Failed to create pool");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    PermissionService::seed_defaults(&pool)
        .await
        .expect("Failed to seed default roles");

    Some(pool)
}

pub fn test_config() -> Config {
    Config {
        database_url: std::env::var("DATABASE_URL").unwrap_or_default(),
        database_max_connections: 5,
        jwt_secret: "test-jwt-secret-minimum-32-characters!!".to_string(),
        jwt_expiration_seconds: 3600,
        refresh_token_ttl_days: 7,
        token_sweep_interval_seconds: 0,
        host: "127.0.0.1".to_string(),
        port: 0, // Random port
    }
}

pub fn create_test_state(pool: PgPool) -> AppState {
    AppState {
        pool,
        config: test_config(),
    }
}

pub fn unique_email(prefix: &str) -> String {
    format!("{}_{}@example.com", prefix, Uuid::new_v4().simple())
}

pub async fn make_request(
    state: &AppState,
    method: &str,
    path: &str,
    body: Option<Value>,
    token: Option<&str>,
) -> (StatusCode, Value) {
    let app = hrms::routes::create_router(state.clone());

    let mut req = Request::builder()
        .method(method)
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json");

    if let Some(t) = token {
        req = req.header(header::AUTHORIZATION, format!("Bearer {}", t));
    }

    let body = body
        .map(|v| Body::from(serde_json::to_string(&v).unwrap()))
        .unwrap_or(Body::empty());

    let response = app.oneshot(req.body(body).unwrap()).await.unwrap();

    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap_or(json!({}));

    (status, json)
}

/// A registered account and the tokens issued to it.
pub struct TestUser {
    pub id: Uuid,
    pub email: String,
    pub password: String,
    pub access_token: String,
    pub refresh_token: String,
}

pub async fn register_user(state: &AppState, employee_id: Option<Uuid>) -> TestUser {
    let email = unique_email("user");
    let password = "password123".to_string();

    let (status, body) = make_request(
        state,
        "POST",
        "/api/auth/register",
        Some(json!({
            "email": email,
            "password": password,
            "employee_id": employee_id,
        })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {body}");

    let data = &body["data"];
    TestUser {
        id: data["user"]["id"].as_str().unwrap().parse().unwrap(),
        email,
        password,
        access_token: data["access_token"].as_str().unwrap().to_string(),
        refresh_token: data["refresh_token"].as_str().unwrap().to_string(),
    }
}

pub async fn login(state: &AppState, user: &TestUser) -> (String, String) {
    let (status, body) = make_request(
        state,
        "POST",
        "/api/auth/login",
        Some(json!({ "email": user.email, "password": user.password })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");

    (
        body["data"]["access_token"].as_str().unwrap().to_string(),
        body["data"]["refresh_token"].as_str().unwrap().to_string(),
    )
}

pub async fn grant_role(pool: &PgPool, user_id: Uuid, role_name: &str) {
    let role = RoleRepository::find_by_name(pool, role_name)
        .await
        .unwrap()
        .expect("role seeded");
    UserRepository::assign_role(pool, user_id, role.id)
        .await
        .unwrap();
}

pub async fn revoke_role(pool: &PgPool, user_id: Uuid, role_name: &str) {
    let role = RoleRepository::find_by_name(pool, role_name)
        .await
        .unwrap()
        .expect("role seeded");
    UserRepository::remove_role(pool, user_id, role.id)
        .await
        .unwrap();
}

pub async fn create_employee(pool: &PgPool, status: EmployeeStatus) -> Employee {
    let input = CreateEmployee {
        first_name: "Test".to_string(),
        last_name: "Employee".to_string(),
        email: unique_email("employee"),
        phone: None,
        position: Some("Engineer".to_string()),
        department_id: None,
        manager_id: None,
        status: Some(status),
        hire_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
    };
    EmployeeRepository::create(pool, &input).await.unwrap()
}
