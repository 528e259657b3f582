//! Customer account handlers.
//!
//! Log-in and registration go through the Storefront API customer mutations;
//! the resulting access token is kept in the session.

use acme_store_core::Email;
use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{
    CspNonce, RequireCustomer, Shopper, clear_customer_token, customer_token, set_customer_token,
};
use crate::routes::layout::{PageContext, PageMeta};
use crate::shopify::{CustomerCreateInput, CustomerUserError, Order};
use crate::state::AppState;

/// Shopify rejects shorter passwords.
const MIN_PASSWORD_LEN: usize = 5;

const INVALID_EMAIL_MESSAGE: &str = "Enter a valid email address.";

// =============================================================================
// Form Types
// =============================================================================

/// Log-in form data.
#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Registration form data.
#[derive(Deserialize)]
pub struct RegisterForm {
    pub email: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// Checkbox; present when ticked.
    pub accepts_marketing: Option<String>,
}

impl std::fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginForm")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl std::fmt::Debug for RegisterForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterForm")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Log-in page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/login.html")]
pub struct LoginTemplate {
    pub page: PageContext,
    pub errors: Vec<String>,
    pub email: String,
}

/// Registration page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/register.html")]
pub struct RegisterTemplate {
    pub page: PageContext,
    pub errors: Vec<String>,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

/// Order row on the account page.
#[derive(Debug, Clone)]
pub struct OrderView {
    pub name: String,
    pub processed_at: String,
    pub financial_status: String,
    pub fulfillment_status: String,
    pub total: String,
}

impl From<&Order> for OrderView {
    fn from(order: &Order) -> Self {
        Self {
            name: order.name.clone(),
            processed_at: order.processed_at.clone(),
            financial_status: order
                .financial_status
                .as_deref()
                .map_or_else(String::new, humanize_status),
            fulfillment_status: humanize_status(&order.fulfillment_status),
            total: order.total.display(),
        }
    }
}

/// Account overview template.
#[derive(Template, WebTemplate)]
#[template(path = "account/index.html")]
pub struct AccountTemplate {
    pub page: PageContext,
    pub name: String,
    pub email: String,
    pub orders: Vec<OrderView>,
}

/// `PARTIALLY_FULFILLED` → `Partially fulfilled`.
fn humanize_status(status: &str) -> String {
    let lower = status.replace('_', " ").to_lowercase();
    let mut chars = lower.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

fn error_messages(errors: Vec<CustomerUserError>) -> Vec<String> {
    errors.into_iter().map(|error| error.message).collect()
}

// =============================================================================
// Log-in
// =============================================================================

/// Display the log-in page.
#[instrument(skip(state, shopper, nonce))]
pub async fn login_page(
    State(state): State<AppState>,
    shopper: Shopper,
    CspNonce(nonce): CspNonce,
) -> Response {
    if shopper.signed_in {
        return Redirect::to("/account").into_response();
    }
    login_form(&state, &shopper, nonce, Vec::new(), String::new())
        .await
        .into_response()
}

async fn login_form(
    state: &AppState,
    shopper: &Shopper,
    nonce: String,
    errors: Vec<String>,
    email: String,
) -> LoginTemplate {
    let meta = PageMeta::new("/account/login").title("Log in");
    LoginTemplate {
        page: PageContext::load(state, shopper, nonce, meta).await,
        errors,
        email,
    }
}

/// Handle log-in form submission.
///
/// # Errors
///
/// Returns an error if the session cannot be updated.
#[instrument(skip(state, session, shopper, nonce))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    shopper: Shopper,
    CspNonce(nonce): CspNonce,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let Ok(email) = Email::parse(&form.email) else {
        let errors = vec![INVALID_EMAIL_MESSAGE.to_string()];
        return Ok(login_form(&state, &shopper, nonce, errors, form.email)
            .await
            .into_response());
    };

    match state
        .storefront()
        .create_customer_access_token(email.as_str(), &form.password)
        .await
    {
        Ok(token) => {
            set_customer_token(&session, &token).await?;
            tracing::info!("Customer logged in");
            Ok(Redirect::to("/account").into_response())
        }
        Err(errors) => {
            tracing::debug!(count = errors.len(), "Log-in rejected");
            Ok(
                login_form(&state, &shopper, nonce, error_messages(errors), form.email)
                    .await
                    .into_response(),
            )
        }
    }
}

// =============================================================================
// Registration
// =============================================================================

/// Display the registration page.
#[instrument(skip(state, shopper, nonce))]
pub async fn register_page(
    State(state): State<AppState>,
    shopper: Shopper,
    CspNonce(nonce): CspNonce,
) -> Response {
    if shopper.signed_in {
        return Redirect::to("/account").into_response();
    }
    let meta = PageMeta::new("/account/register").title("Create account");
    RegisterTemplate {
        page: PageContext::load(&state, &shopper, nonce, meta).await,
        errors: Vec::new(),
        email: String::new(),
        first_name: String::new(),
        last_name: String::new(),
    }
    .into_response()
}

/// Validate the registration form into Shopify input.
fn customer_input(form: &RegisterForm) -> std::result::Result<CustomerCreateInput, Vec<String>> {
    let mut errors = Vec::new();
    let email = Email::parse(&form.email);
    if email.is_err() {
        errors.push(INVALID_EMAIL_MESSAGE.to_string());
    }
    if form.password.chars().count() < MIN_PASSWORD_LEN {
        errors.push(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters."
        ));
    }

    let non_blank = |value: &Option<String>| {
        value
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(String::from)
    };

    match email {
        Ok(email) if errors.is_empty() => Ok(CustomerCreateInput {
            email: email.into_inner(),
            password: form.password.clone(),
            first_name: non_blank(&form.first_name),
            last_name: non_blank(&form.last_name),
            accepts_marketing: form.accepts_marketing.is_some(),
        }),
        _ => Err(errors),
    }
}

/// Handle registration form submission.
///
/// A successful registration logs the new customer in.
///
/// # Errors
///
/// Returns an error if the session cannot be updated.
#[instrument(skip(state, session, shopper, nonce))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    shopper: Shopper,
    CspNonce(nonce): CspNonce,
    Form(form): Form<RegisterForm>,
) -> Result<Response> {
    let storefront = state.storefront();
    let created = match customer_input(&form) {
        Ok(input) => {
            let email = input.email.clone();
            storefront
                .create_customer(input)
                .await
                .map(|()| email)
                .map_err(error_messages)
        }
        Err(errors) => Err(errors),
    };

    let email = match created {
        Ok(email) => email,
        Err(errors) => {
            let meta = PageMeta::new("/account/register").title("Create account");
            return Ok(RegisterTemplate {
                page: PageContext::load(&state, &shopper, nonce, meta).await,
                errors,
                email: form.email,
                first_name: form.first_name.unwrap_or_default(),
                last_name: form.last_name.unwrap_or_default(),
            }
            .into_response());
        }
    };

    tracing::info!("Customer registered");
    match storefront
        .create_customer_access_token(&email, &form.password)
        .await
    {
        Ok(token) => {
            set_customer_token(&session, &token).await?;
            Ok(Redirect::to("/account").into_response())
        }
        // Accounts needing email confirmation cannot log in yet
        Err(_) => Ok(Redirect::to("/account/login").into_response()),
    }
}

// =============================================================================
// Log-out
// =============================================================================

/// Handle log-out: revoke the token upstream and forget it.
///
/// # Errors
///
/// Returns an error if the session cannot be updated.
#[instrument(skip_all)]
pub async fn logout(State(state): State<AppState>, session: Session) -> Result<Redirect> {
    if let Some(token) = customer_token(&session).await {
        state
            .storefront()
            .delete_customer_access_token(&token.access_token)
            .await;
    }
    clear_customer_token(&session).await?;
    clear_sentry_user();
    Ok(Redirect::to("/"))
}

// =============================================================================
// Account Overview
// =============================================================================

/// Display the account overview.
///
/// A token Shopify no longer accepts is dropped and the customer is sent to
/// log in again.
///
/// # Errors
///
/// Returns an error if the session cannot be updated.
#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    shopper: Shopper,
    CspNonce(nonce): CspNonce,
    RequireCustomer(token): RequireCustomer,
) -> Result<Response> {
    let Some(customer) = state.storefront().get_customer(&token.access_token).await else {
        clear_customer_token(&session).await?;
        return Ok(Redirect::to("/account/login").into_response());
    };

    set_sentry_user(&customer.id, customer.email.as_deref());

    let meta = PageMeta::new("/account").title("Account");
    Ok(AccountTemplate {
        page: PageContext::load(&state, &shopper, nonce, meta).await,
        name: customer.display_name(),
        email: customer.email.clone().unwrap_or_default(),
        orders: customer.orders.iter().map(OrderView::from).collect(),
    }
    .into_response())
}
