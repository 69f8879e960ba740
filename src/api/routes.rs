//! API Routes
//!
//! HTTP endpoint definitions. The boundary parses and validates request
//! bodies, then delegates mutations to the command handlers; read-only
//! listings query the stores directly.

use std::time::Duration;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch, post, put},
    Json, Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{Customer, Transaction, VerificationStatus};
use crate::error::AppError;
use crate::handlers::{
    CheckLimitCommand, CheckLimitHandler, CreateTransactionCommand, CreateTransactionHandler,
    LimitItem, RegisterCustomerCommand, RegisterCustomerHandler, SetLimitsCommand,
    SetLimitsHandler, VerifyCustomerCommand, VerifyCustomerHandler,
};
use crate::store::{CustomerStore, LimitStore, TenorCatalog, TransactionLedger};

/// Shared router state
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    /// Deadline for operations that run inside a unit of work
    pub uow_timeout: Duration,
}

// =========================================================================
// Request/Response types
// =========================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterCustomerRequest {
    pub national_id: String,
    pub full_name: String,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    #[serde(default)]
    pub monthly_salary: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateCustomerRequest {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    #[serde(default)]
    pub monthly_salary: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CustomerResponse {
    pub id: Uuid,
    pub national_id: String,
    pub full_name: String,
    pub birth_date: Option<NaiveDate>,
    pub monthly_salary: Option<Decimal>,
    pub verification_status: VerificationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Customer> for CustomerResponse {
    fn from(c: Customer) -> Self {
        Self {
            id: c.id,
            national_id: c.national_id,
            full_name: c.full_name,
            birth_date: c.birth_date,
            monthly_salary: c.monthly_salary,
            verification_status: c.verification_status,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VerifyCustomerRequest {
    pub status: VerificationStatus,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SetLimitsRequest {
    pub items: Vec<LimitItemRequest>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LimitItemRequest {
    pub tenor_months: i32,
    pub limit_amount: String,
}

#[derive(Debug, Serialize)]
pub struct SetLimitsResponse {
    pub customer_id: Uuid,
    pub limits_written: usize,
}

#[derive(Debug, Serialize)]
pub struct LimitEntryResponse {
    pub tenor_id: Uuid,
    pub tenor_months: i32,
    pub limit_amount: Decimal,
}

#[derive(Debug, Serialize)]
pub struct CustomerLimitsResponse {
    pub customer_id: Uuid,
    pub limits: Vec<LimitEntryResponse>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CheckLimitRequest {
    pub national_id: String,
    pub tenor_months: i32,
    pub amount: String,
}

#[derive(Debug, Serialize)]
pub struct CheckLimitResponse {
    /// "approved" or "rejected"; advisory only, not authoritative
    pub status: String,
    pub message: String,
    pub remaining_limit: Decimal,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateTransactionRequest {
    pub national_id: String,
    pub tenor_months: i32,
    pub asset_name: String,
    pub otr_amount: String,
    pub admin_fee: String,
}

#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    pub id: Uuid,
    pub contract_number: String,
    pub customer_id: Uuid,
    pub tenor_id: Uuid,
    pub asset_name: String,
    pub otr_amount: Decimal,
    pub admin_fee: Decimal,
    pub total_interest: Decimal,
    pub total_installment: Decimal,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl From<Transaction> for TransactionResponse {
    fn from(t: Transaction) -> Self {
        Self {
            id: t.id,
            contract_number: t.contract_number,
            customer_id: t.customer_id,
            tenor_id: t.tenor_id,
            asset_name: t.asset_name,
            otr_amount: t.otr_amount,
            admin_fee: t.admin_fee,
            total_interest: t.total_interest,
            total_installment: t.total_installment,
            status: t.status.as_str().to_string(),
            created_at: t.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TransactionListResponse {
    pub customer_id: Uuid,
    pub transactions: Vec<TransactionResponse>,
}

#[derive(Debug, Serialize)]
pub struct TenorResponse {
    pub id: Uuid,
    pub duration_months: i32,
    pub description: Option<String>,
}

// =========================================================================
// API Router
// =========================================================================

/// Create the API router
pub fn create_router() -> Router<AppState> {
    Router::new()
        // Customer lifecycle
        .route("/customers", post(register_customer))
        .route("/customers/:customer_id", get(get_customer))
        .route("/customers/:customer_id", patch(update_customer))
        .route("/customers/:customer_id/verify", post(verify_customer))
        // Limit administration
        .route("/customers/:customer_id/limits", put(set_limits))
        .route("/customers/:customer_id/limits", get(get_limits))
        // Authorization
        .route("/limits/check", post(check_limit))
        .route("/transactions", post(create_transaction))
        // Reads
        .route("/transactions/:transaction_id", get(get_transaction))
        .route(
            "/customers/:customer_id/transactions",
            get(get_customer_transactions),
        )
        .route("/tenors", get(get_tenors))
}

// =========================================================================
// POST /customers
// =========================================================================

/// Register a new customer (verification starts pending)
async fn register_customer(
    State(state): State<AppState>,
    Json(request): Json<RegisterCustomerRequest>,
) -> Result<(StatusCode, Json<CustomerResponse>), AppError> {
    let handler = RegisterCustomerHandler::new(state.pool);

    let mut command = RegisterCustomerCommand::new(request.national_id, request.full_name);
    command.birth_date = request.birth_date;
    command.monthly_salary = request.monthly_salary;

    let customer = handler.execute(command).await?;

    Ok((StatusCode::CREATED, Json(customer.into())))
}

// =========================================================================
// GET /customers/:customer_id
// =========================================================================

async fn get_customer(
    State(state): State<AppState>,
    Path(customer_id): Path<Uuid>,
) -> Result<Json<CustomerResponse>, AppError> {
    let customer = CustomerStore::new(state.pool)
        .find_by_id(customer_id)
        .await?
        .ok_or_else(|| {
            crate::domain::DomainError::CustomerNotFound(customer_id.to_string())
        })?;

    Ok(Json(customer.into()))
}

// =========================================================================
// PATCH /customers/:customer_id
// =========================================================================

/// Update non-limit profile fields
async fn update_customer(
    State(state): State<AppState>,
    Path(customer_id): Path<Uuid>,
    Json(request): Json<UpdateCustomerRequest>,
) -> Result<Json<CustomerResponse>, AppError> {
    let store = CustomerStore::new(state.pool);

    let monthly_salary = request
        .monthly_salary
        .as_deref()
        .map(str::parse::<Decimal>)
        .transpose()
        .map_err(|e| AppError::InvalidRequest(format!("Invalid monthly_salary: {}", e)))?;

    if monthly_salary.is_some_and(|salary| salary < Decimal::ZERO) {
        return Err(AppError::InvalidRequest(
            "monthly_salary must not be negative".to_string(),
        ));
    }

    let rows = store
        .update_profile(
            customer_id,
            request.full_name.as_deref(),
            request.birth_date,
            monthly_salary,
        )
        .await?;

    if rows == 0 {
        return Err(
            crate::domain::DomainError::CustomerNotFound(customer_id.to_string()).into(),
        );
    }

    let customer = store
        .find_by_id(customer_id)
        .await?
        .ok_or_else(|| crate::domain::DomainError::CustomerNotFound(customer_id.to_string()))?;

    Ok(Json(customer.into()))
}

// =========================================================================
// POST /customers/:customer_id/verify
// =========================================================================

async fn verify_customer(
    State(state): State<AppState>,
    Path(customer_id): Path<Uuid>,
    Json(request): Json<VerifyCustomerRequest>,
) -> Result<Json<CustomerResponse>, AppError> {
    let handler = VerifyCustomerHandler::new(state.pool, state.uow_timeout);

    let customer = handler
        .execute(VerifyCustomerCommand {
            customer_id,
            status: request.status,
        })
        .await?;

    Ok(Json(customer.into()))
}

// =========================================================================
// PUT /customers/:customer_id/limits
// =========================================================================

async fn set_limits(
    State(state): State<AppState>,
    Path(customer_id): Path<Uuid>,
    Json(request): Json<SetLimitsRequest>,
) -> Result<Json<SetLimitsResponse>, AppError> {
    let handler = SetLimitsHandler::new(state.pool, state.uow_timeout);

    let items = request
        .items
        .into_iter()
        .map(|item| LimitItem {
            tenor_months: item.tenor_months,
            limit_amount: item.limit_amount,
        })
        .collect();

    let limits_written = handler
        .execute(SetLimitsCommand::new(customer_id, items))
        .await?;

    Ok(Json(SetLimitsResponse {
        customer_id,
        limits_written,
    }))
}

// =========================================================================
// GET /customers/:customer_id/limits
// =========================================================================

async fn get_limits(
    State(state): State<AppState>,
    Path(customer_id): Path<Uuid>,
) -> Result<Json<CustomerLimitsResponse>, AppError> {
    let customers = CustomerStore::new(state.pool.clone());

    if customers.find_by_id(customer_id).await?.is_none() {
        return Err(
            crate::domain::DomainError::CustomerNotFound(customer_id.to_string()).into(),
        );
    }

    let limits = LimitStore::new(state.pool)
        .list_for_customer(customer_id)
        .await?
        .into_iter()
        .map(|(tenor_id, tenor_months, limit_amount)| LimitEntryResponse {
            tenor_id,
            tenor_months,
            limit_amount,
        })
        .collect();

    Ok(Json(CustomerLimitsResponse {
        customer_id,
        limits,
    }))
}

// =========================================================================
// POST /limits/check
// =========================================================================

/// Advisory limit check. Non-locking; repeated calls with no intervening
/// writes return the same remaining limit, but a concurrent transaction may
/// invalidate the answer before the caller acts on it.
async fn check_limit(
    State(state): State<AppState>,
    Json(request): Json<CheckLimitRequest>,
) -> Result<Json<CheckLimitResponse>, AppError> {
    let handler = CheckLimitHandler::new(state.pool);

    let decision = handler
        .execute(CheckLimitCommand::new(
            request.national_id,
            request.tenor_months,
            request.amount,
        ))
        .await?;

    let (status, message) = if decision.approved {
        ("approved", "requested amount fits within the remaining limit")
    } else {
        ("rejected", "requested amount exceeds the remaining limit")
    };

    Ok(Json(CheckLimitResponse {
        status: status.to_string(),
        message: message.to_string(),
        remaining_limit: decision.remaining_limit,
    }))
}

// =========================================================================
// POST /transactions
// =========================================================================

async fn create_transaction(
    State(state): State<AppState>,
    Json(request): Json<CreateTransactionRequest>,
) -> Result<(StatusCode, Json<TransactionResponse>), AppError> {
    let handler = CreateTransactionHandler::new(state.pool, state.uow_timeout);

    let transaction = handler
        .execute(CreateTransactionCommand::new(
            request.national_id,
            request.tenor_months,
            request.asset_name,
            request.otr_amount,
            request.admin_fee,
        ))
        .await?;

    Ok((StatusCode::CREATED, Json(transaction.into())))
}

// =========================================================================
// GET /transactions/:transaction_id
// =========================================================================

async fn get_transaction(
    State(state): State<AppState>,
    Path(transaction_id): Path<Uuid>,
) -> Result<Json<TransactionResponse>, AppError> {
    let transaction = TransactionLedger::new(state.pool)
        .find_by_id(transaction_id)
        .await?
        .ok_or_else(|| AppError::TransactionNotFound(transaction_id.to_string()))?;

    Ok(Json(transaction.into()))
}

// =========================================================================
// GET /customers/:customer_id/transactions
// =========================================================================

async fn get_customer_transactions(
    State(state): State<AppState>,
    Path(customer_id): Path<Uuid>,
) -> Result<Json<TransactionListResponse>, AppError> {
    let customers = CustomerStore::new(state.pool.clone());

    if customers.find_by_id(customer_id).await?.is_none() {
        return Err(
            crate::domain::DomainError::CustomerNotFound(customer_id.to_string()).into(),
        );
    }

    let transactions = TransactionLedger::new(state.pool)
        .list_for_customer(customer_id, 100)
        .await?
        .into_iter()
        .map(TransactionResponse::from)
        .collect();

    Ok(Json(TransactionListResponse {
        customer_id,
        transactions,
    }))
}

// =========================================================================
// GET /tenors
// =========================================================================

async fn get_tenors(
    State(state): State<AppState>,
) -> Result<Json<Vec<TenorResponse>>, AppError> {
    let tenors = TenorCatalog::new(state.pool)
        .find_all()
        .await?
        .into_iter()
        .map(|t| TenorResponse {
            id: t.id,
            duration_months: t.duration_months,
            description: t.description,
        })
        .collect();

    Ok(Json(tenors))
}
