// kharcha - Web Server
// REST API over the expense store + embedded dashboard page

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json},
    routing::get,
    Router,
};
use chrono::{Datelike, Local, NaiveDate};
use kharcha::{analytics, format, Expense, ExpenseInput, ExpensePatch, ExpenseStore, Storage};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

/// Store + storage behind one lock: every request sees a consistent
/// collection and mutations persist before the lock is released.
struct Session {
    store: ExpenseStore,
    storage: Option<Storage>,
}

impl Session {
    fn persist(&mut self) {
        if let Some(storage) = self.storage.as_mut() {
            if let Err(e) = storage.save(&self.store.snapshot()) {
                eprintln!("Error saving expenses: {}", e);
            }
        }
    }
}

/// Shared application state
#[derive(Clone)]
struct AppState {
    session: Arc<Mutex<Session>>,
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            error: None,
        }
    }

    fn err(data: T, error: String) -> Self {
        Self {
            success: false,
            data,
            error: Some(error),
        }
    }
}

/// Create payload
#[derive(Deserialize)]
struct ExpenseRequest {
    amount: f64,
    description: String,
    category: String,
    date: String,
}

/// Update payload - absent fields stay unchanged
#[derive(Deserialize)]
struct ExpensePatchRequest {
    amount: Option<f64>,
    description: Option<String>,
    category: Option<String>,
    date: Option<String>,
}

/// Stats response (dashboard scope)
#[derive(Serialize)]
struct StatsResponse {
    month_total: f64,
    previous_month_total: f64,
    monthly_change: f64,
    all_time_total: f64,
    transaction_count: usize,
    top_categories: Vec<CategoryShareResponse>,
    recent: Vec<Expense>,
    formatted_month_total: String,
    formatted_all_time_total: String,
}

#[derive(Serialize)]
struct CategoryShareResponse {
    category: String,
    amount: f64,
    percentage: f64,
    color: String,
    icon: String,
}

impl From<analytics::CategoryShare> for CategoryShareResponse {
    fn from(share: analytics::CategoryShare) -> Self {
        Self {
            color: kharcha::category::color(&share.category).to_string(),
            icon: kharcha::category::icon(&share.category).to_string(),
            category: share.category,
            amount: share.amount,
            percentage: share.percentage,
        }
    }
}

/// Year-scoped analytics response
#[derive(Serialize)]
struct AnalyticsResponse {
    year: i32,
    total: f64,
    monthly_average: f64,
    monthly_trend: f64,
    transaction_count: usize,
    highest_month: Option<HighestMonthResponse>,
    breakdown: Vec<CategoryShareResponse>,
    monthly: Vec<MonthResponse>,
    available_years: Vec<i32>,
}

#[derive(Serialize)]
struct HighestMonthResponse {
    month: String,
    amount: f64,
}

#[derive(Serialize)]
struct MonthResponse {
    month: String,
    amount: f64,
    count: usize,
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    raw.parse()
        .map_err(|_| format!("'{}' is not a valid date (expected YYYY-MM-DD)", raw))
}

fn validation_message(errors: &[kharcha::ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/expenses - Get all expenses (store order, newest first)
async fn list_expenses(State(state): State<AppState>) -> impl IntoResponse {
    let session = state.session.lock().unwrap();
    Json(ApiResponse::ok(session.store.all().to_vec()))
}

/// POST /api/expenses - Create an expense
async fn create_expense(
    State(state): State<AppState>,
    Json(payload): Json<ExpenseRequest>,
) -> impl IntoResponse {
    let date = match parse_date(&payload.date) {
        Ok(date) => date,
        Err(message) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::err(None::<Expense>, message)),
            )
                .into_response();
        }
    };

    let input = ExpenseInput {
        amount: payload.amount,
        description: payload.description,
        category: payload.category,
        date,
    };

    let mut session = state.session.lock().unwrap();
    let created = match session.store.add(input) {
        Ok(expense) => expense.clone(),
        Err(errors) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::err(
                    None::<Expense>,
                    validation_message(&errors),
                )),
            )
                .into_response();
        }
    };

    session.persist();
    (StatusCode::CREATED, Json(ApiResponse::ok(Some(created)))).into_response()
}

/// PUT /api/expenses/:id - Partial update
async fn update_expense(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<ExpensePatchRequest>,
) -> impl IntoResponse {
    let date = match payload.date.as_deref().map(parse_date) {
        None => None,
        Some(Ok(date)) => Some(date),
        Some(Err(message)) => {
            return (StatusCode::BAD_REQUEST, Json(ApiResponse::err((), message)))
                .into_response();
        }
    };

    let patch = ExpensePatch {
        amount: payload.amount,
        description: payload.description,
        category: payload.category,
        date,
    };

    let mut session = state.session.lock().unwrap();
    match session.store.update(&id, patch) {
        Ok(true) => {
            session.persist();
            (StatusCode::OK, Json(ApiResponse::ok(()))).into_response()
        }
        Ok(false) => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::err((), format!("no expense with id {}", id))),
        )
            .into_response(),
        Err(errors) => (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::err((), validation_message(&errors))),
        )
            .into_response(),
    }
}

/// DELETE /api/expenses/:id - Remove an expense
async fn delete_expense(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let mut session = state.session.lock().unwrap();
    if session.store.delete(&id) {
        session.persist();
        (StatusCode::OK, Json(ApiResponse::ok(()))).into_response()
    } else {
        (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::err((), format!("no expense with id {}", id))),
        )
            .into_response()
    }
}

/// GET /api/expenses/category/:name - Expenses of one category
async fn expenses_by_category(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> impl IntoResponse {
    // Decode URL-encoded names like "Food%20%26%20Dining"
    let decoded = urlencoding::decode(&name)
        .unwrap_or_else(|_| name.clone().into())
        .into_owned();

    let session = state.session.lock().unwrap();
    let matching: Vec<Expense> = session
        .store
        .all()
        .iter()
        .filter(|e| e.category == decoded)
        .cloned()
        .collect();

    Json(ApiResponse::ok(matching))
}

/// GET /api/stats - Dashboard statistics
async fn get_stats(State(state): State<AppState>) -> impl IntoResponse {
    let session = state.session.lock().unwrap();
    let today = Local::now().date_naive();
    let stats = analytics::dashboard_stats(session.store.all(), today);

    let response = StatsResponse {
        formatted_month_total: format::format_inr(stats.month_total),
        formatted_all_time_total: format::format_inr(stats.all_time_total),
        month_total: stats.month_total,
        previous_month_total: stats.previous_month_total,
        monthly_change: stats.monthly_change,
        all_time_total: stats.all_time_total,
        transaction_count: stats.transaction_count,
        top_categories: stats.top_categories.into_iter().map(Into::into).collect(),
        recent: stats.recent,
    };

    Json(ApiResponse::ok(response))
}

/// GET /api/analytics/:year - Year-scoped analytics
async fn get_analytics(State(state): State<AppState>, Path(year): Path<i32>) -> impl IntoResponse {
    let session = state.session.lock().unwrap();
    let today = Local::now().date_naive();
    let report = analytics::year_report(session.store.all(), year, today);

    let response = AnalyticsResponse {
        year: report.year,
        total: report.total,
        monthly_average: report.monthly_average,
        monthly_trend: report.monthly_trend,
        transaction_count: report.transaction_count,
        highest_month: report
            .highest_month
            .map(|(month, amount)| HighestMonthResponse {
                month: format::month_name(month).to_string(),
                amount,
            }),
        breakdown: report.breakdown.into_iter().map(Into::into).collect(),
        monthly: report
            .monthly
            .iter()
            .enumerate()
            .map(|(month, bucket)| MonthResponse {
                month: format::month_name(month).to_string(),
                amount: bucket.amount,
                count: bucket.count,
            })
            .collect(),
        available_years: analytics::available_years(session.store.all(), today),
    };

    Json(ApiResponse::ok(response))
}

/// GET / - Serve the dashboard page
async fn serve_index() -> impl IntoResponse {
    Html(include_str!("../web/index.html"))
}

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() {
    println!("🌐 kharcha - Web Server");
    println!("━━━━━━━━━━━━━━━━━━━━━━━");

    let db_path = std::env::var("KHARCHA_DB").unwrap_or_else(|_| "kharcha.db".to_string());
    let db_path = std::path::PathBuf::from(db_path);

    // Storage failure degrades to an empty in-memory session
    let mut store = ExpenseStore::new();
    let storage = match Storage::open(&db_path) {
        Ok(storage) => {
            match storage.load() {
                Ok(expenses) => store.load(expenses),
                Err(e) => eprintln!("⚠ Could not read saved expenses: {}", e),
            }
            println!("✓ Database opened: {:?}", db_path);
            Some(storage)
        }
        Err(e) => {
            eprintln!("⚠ Storage unavailable ({}), changes will not persist", e);
            None
        }
    };
    println!("✓ Loaded {} expenses", store.len());

    let state = AppState {
        session: Arc::new(Mutex::new(Session { store, storage })),
    };

    // Build API routes
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/expenses", get(list_expenses).post(create_expense))
        .route(
            "/expenses/:id",
            axum::routing::put(update_expense).delete(delete_expense),
        )
        .route("/expenses/category/:name", get(expenses_by_category))
        .route("/stats", get(get_stats))
        .route("/analytics/:year", get(get_analytics))
        .with_state(state.clone());

    // Build main router
    let app = Router::new()
        .route("/", get(serve_index))
        .nest("/api", api_routes)
        .nest_service("/static", ServeDir::new("web"))
        .layer(CorsLayer::permissive());

    // Start server
    let addr = std::env::var("KHARCHA_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    let current_year = Local::now().date_naive().year();
    println!("\n🚀 Server running on http://{}", addr);
    println!("   API: http://{}/api/expenses", addr);
    println!("   API: http://{}/api/analytics/{}", addr, current_year);
    println!("   UI:  http://{}", addr);
    println!("\n   Press Ctrl+C to stop\n");

    axum::serve(listener, app)
        .await
        .expect("Failed to start server");
}
