use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use password_hash::rand_core::OsRng;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use crate::{
    audit,
    dto::auth::{Claims, LoginRequest, LoginResponse, RegisterRequest},
    entity::customers::{ActiveModel, Column, Entity as Customers},
    error::{AppError, AppResult},
    middleware::auth::{AuthCustomer, jwt_secret},
    models::Customer,
    response::{ApiResponse, Meta},
    services::customer_service::{
        customer_from_entity, email_taken, find_customer, required, validate_email,
    },
    state::AppState,
};

const MIN_PASSWORD_LEN: usize = 6;
const TOKEN_TTL_HOURS: i64 = 24;

pub async fn register_customer(
    state: &AppState,
    payload: RegisterRequest,
) -> AppResult<ApiResponse<Customer>> {
    let RegisterRequest {
        name,
        email,
        password,
    } = payload;
    let name = required("name", &name)?;
    let email = validate_email(&email)?;
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::BadRequest(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    if email_taken(&state.orm, &email, Uuid::nil()).await? {
        return Err(AppError::BadRequest("Email is already taken".to_string()));
    }

    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string();

    let now = Utc::now();
    let customer = ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name),
        email: Set(email),
        phone: Set(String::new()),
        address: Set(String::new()),
        password_hash: Set(Some(password_hash)),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        state,
        Some(customer.id),
        "customer_register",
        "customers",
        serde_json::json!({ "customer_id": customer.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Registration successful",
        customer_from_entity(customer),
        Some(Meta::empty()),
    ))
}

pub async fn login_customer(
    state: &AppState,
    payload: LoginRequest,
) -> AppResult<ApiResponse<LoginResponse>> {
    let LoginRequest { email, password } = payload;
    let email = email.trim().to_lowercase();

    let customer = Customers::find()
        .filter(Column::Email.eq(email.as_str()))
        .filter(Column::PasswordHash.is_not_null())
        .one(&state.orm)
        .await?;

    let customer = match customer {
        Some(c) => c,
        None => return Err(AppError::BadRequest("Invalid email or password".into())),
    };

    let stored_hash = customer.password_hash.as_deref().unwrap_or_default();
    let parsed_hash = PasswordHash::new(stored_hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;

    let argon2 = Argon2::default();
    if argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_err()
    {
        return Err(AppError::BadRequest("Invalid email or password".into()));
    }

    let token = issue_token(jwt_secret(state)?, customer.id)?;

    audit::record(
        state,
        Some(customer.id),
        "customer_login",
        "customers",
        serde_json::json!({ "customer_id": customer.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Login successful",
        LoginResponse {
            token,
            customer: customer_from_entity(customer),
        },
        Some(Meta::empty()),
    ))
}

pub async fn current_customer(
    state: &AppState,
    auth: &AuthCustomer,
) -> AppResult<ApiResponse<Customer>> {
    let customer = find_customer(&state.orm, auth.customer_id).await?;
    Ok(ApiResponse::success(
        "Customer fetched successfully",
        customer_from_entity(customer),
        Some(Meta::empty()),
    ))
}

/// HS256 token whose subject is the customer id.
pub fn issue_token(secret: &str, customer_id: Uuid) -> AppResult<String> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(TOKEN_TTL_HOURS))
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let claims = Claims {
        sub: customer_id.to_string(),
        exp: expiration.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}
