//! Cart route handlers.
//!
//! Cart operations use HTMX for dynamic updates without full page reloads;
//! plain form posts fall back to a redirect to `/cart`. The cart ID lives in
//! the session.

use acme_store_core::{CartLineGid, VariantGid};
use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::HeaderMap,
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::add_breadcrumb;
use crate::filters;
use crate::middleware::session::{clear_cart_id, set_cart_id};
use crate::middleware::{CspNonce, Shopper};
use crate::routes::layout::{PageContext, PageMeta};
use crate::shopify::{Cart, CartLine, CartLineInput, CartLineUpdateInput, Image};
use crate::state::AppState;
use crate::variant::{SelectionParams, product_url};

pub const MISSING_VARIANT_MESSAGE: &str = "Missing product variant ID";
pub const ADD_ERROR_MESSAGE: &str = "Error adding item to cart";
pub const UPDATE_ERROR_MESSAGE: &str = "Error updating item quantity";
pub const REMOVE_ERROR_MESSAGE: &str = "Error removing item from cart";

/// Shopify's option name for variant-less products.
const DEFAULT_VARIANT_TITLE: &str = "Default Title";

/// Event fired on the page after every cart change.
const CART_UPDATED_TRIGGER: (&str, &str) = ("HX-Trigger", "cart-updated");

// =============================================================================
// Views
// =============================================================================

/// Cart line display data for templates.
#[derive(Debug, Clone)]
pub struct CartLineView {
    pub id: String,
    pub variant_id: String,
    pub title: String,
    pub variant_title: Option<String>,
    pub url: String,
    pub image: Option<Image>,
    pub quantity: i64,
    /// Line total exactly as Shopify computed it.
    pub total: String,
}

impl From<&CartLine> for CartLineView {
    fn from(line: &CartLine) -> Self {
        let merchandise = &line.merchandise;
        let params: SelectionParams = merchandise
            .selected_options
            .iter()
            .filter(|option| option.value != DEFAULT_VARIANT_TITLE)
            .map(|option| (option.name.to_lowercase(), option.value.clone()))
            .collect();

        Self {
            id: line.id.clone(),
            variant_id: merchandise.id.clone(),
            title: merchandise.product.title.clone(),
            variant_title: (merchandise.title != DEFAULT_VARIANT_TITLE)
                .then(|| merchandise.title.clone()),
            url: product_url(&merchandise.product.handle, &params),
            image: merchandise.product.featured_image.clone(),
            quantity: line.quantity,
            total: line.total_amount.display(),
        }
    }
}

/// Cart display data for templates.
#[derive(Debug, Clone, Default)]
pub struct CartView {
    pub lines: Vec<CartLineView>,
    pub subtotal: String,
    pub taxes: String,
    pub total: String,
    pub total_quantity: i64,
}

impl CartView {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            lines: cart.lines.iter().map(CartLineView::from).collect(),
            subtotal: cart.cost.subtotal_amount.display(),
            taxes: cart.cost.total_tax_amount.display(),
            total: cart.cost.total_amount.display(),
            total_quantity: cart.total_quantity,
        }
    }
}

// =============================================================================
// Forms
// =============================================================================

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub variant_id: Option<String>,
    pub quantity: Option<u32>,
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub line_id: String,
    pub variant_id: String,
    pub quantity: i64,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub line_id: String,
}

// =============================================================================
// Templates
// =============================================================================

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub page: PageContext,
    pub cart: CartView,
    pub error: Option<String>,
}

/// Cart items fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
    pub error: Option<String>,
}

/// Add-to-cart status fragment (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_message.html")]
pub struct CartMessageTemplate {
    pub message: Option<&'static str>,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: i64,
}

fn is_htmx(headers: &HeaderMap) -> bool {
    headers.contains_key("hx-request")
}

/// Remember the cart Shopify answered with.
async fn remember_cart(session: &Session, cart: &Cart) {
    if let Err(e) = set_cart_id(session, &cart.id).await {
        tracing::error!("Failed to save cart ID to session: {e}");
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Display cart page.
#[instrument(skip(state, shopper, nonce))]
pub async fn show(
    State(state): State<AppState>,
    shopper: Shopper,
    CspNonce(nonce): CspNonce,
) -> CartShowTemplate {
    let cart = match &shopper.cart_id {
        Some(cart_id) => state.storefront().get_cart(cart_id).await,
        None => None,
    };

    let meta = PageMeta::new("/cart").title("Cart");
    let page = PageContext::load(&state, &shopper, nonce, meta).await;

    CartShowTemplate {
        page,
        cart: cart.as_ref().map(CartView::from).unwrap_or_default(),
        error: None,
    }
}

/// Add item to cart.
///
/// Creates the cart on first add, and again when Shopify no longer knows the
/// stored cart.
#[instrument(skip(state, session, shopper, headers))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    shopper: Shopper,
    headers: HeaderMap,
    Form(form): Form<AddToCartForm>,
) -> Response {
    let Some(variant_id) = form
        .variant_id
        .as_deref()
        .and_then(|id| VariantGid::parse(id.trim()).ok())
    else {
        return CartMessageTemplate {
            message: Some(MISSING_VARIANT_MESSAGE),
        }
        .into_response();
    };

    let line = CartLineInput {
        merchandise_id: variant_id.to_string(),
        quantity: i64::from(form.quantity.unwrap_or(1).max(1)),
    };

    let storefront = state.storefront();
    let cart = match &shopper.cart_id {
        Some(cart_id) => match storefront.add_to_cart(cart_id, vec![line.clone()]).await {
            Some(cart) => Some(cart),
            // Only replace the stored cart once Shopify confirms it is gone
            None => match storefront.find_cart(cart_id).await {
                Ok(None) => {
                    tracing::info!("Stored cart is gone, creating a new one");
                    storefront.create_cart(shopper.market, vec![line]).await
                }
                Ok(Some(_)) => None,
                Err(e) => {
                    tracing::warn!(error = %e, "Cart lookup failed, keeping stored cart");
                    None
                }
            },
        },
        None => storefront.create_cart(shopper.market, vec![line]).await,
    };

    let Some(cart) = cart else {
        return CartMessageTemplate {
            message: Some(ADD_ERROR_MESSAGE),
        }
        .into_response();
    };

    remember_cart(&session, &cart).await;
    add_breadcrumb(
        "cart",
        "Added item to cart",
        Some(&[("variant_id", variant_id.as_str())]),
    );

    if is_htmx(&headers) {
        (
            AppendHeaders([CART_UPDATED_TRIGGER]),
            CartMessageTemplate { message: None },
        )
            .into_response()
    } else {
        Redirect::to("/cart").into_response()
    }
}

/// Update a line's quantity; zero removes the line.
#[instrument(skip(state, shopper, headers))]
pub async fn update(
    State(state): State<AppState>,
    shopper: Shopper,
    headers: HeaderMap,
    Form(form): Form<UpdateCartForm>,
) -> Response {
    let storefront = state.storefront();
    let ids = CartLineGid::parse(&form.line_id)
        .ok()
        .zip(VariantGid::parse(&form.variant_id).ok());

    let updated = match (&shopper.cart_id, ids) {
        (Some(cart_id), Some((line_id, _))) if form.quantity <= 0 => {
            storefront
                .remove_from_cart(cart_id, vec![line_id.into()])
                .await
        }
        (Some(cart_id), Some((line_id, variant_id))) => {
            storefront
                .update_cart(
                    cart_id,
                    vec![CartLineUpdateInput {
                        id: line_id.into(),
                        merchandise_id: variant_id.into(),
                        quantity: form.quantity,
                    }],
                )
                .await
        }
        _ => None,
    };

    cart_fragment(&state, &shopper, &headers, updated, UPDATE_ERROR_MESSAGE).await
}

/// Remove a line from the cart.
#[instrument(skip(state, shopper, headers))]
pub async fn remove(
    State(state): State<AppState>,
    shopper: Shopper,
    headers: HeaderMap,
    Form(form): Form<RemoveFromCartForm>,
) -> Response {
    let updated = match (&shopper.cart_id, CartLineGid::parse(&form.line_id)) {
        (Some(cart_id), Ok(line_id)) => {
            state
                .storefront()
                .remove_from_cart(cart_id, vec![line_id.into()])
                .await
        }
        _ => None,
    };

    cart_fragment(&state, &shopper, &headers, updated, REMOVE_ERROR_MESSAGE).await
}

/// Respond to a cart line mutation.
///
/// On failure the current cart is re-read so the fragment still shows it,
/// along with `error`.
async fn cart_fragment(
    state: &AppState,
    shopper: &Shopper,
    headers: &HeaderMap,
    updated: Option<Cart>,
    error: &str,
) -> Response {
    if !is_htmx(headers) {
        return Redirect::to("/cart").into_response();
    }

    match updated {
        Some(cart) => (
            AppendHeaders([CART_UPDATED_TRIGGER]),
            CartItemsTemplate {
                cart: CartView::from(&cart),
                error: None,
            },
        )
            .into_response(),
        None => {
            let current = match &shopper.cart_id {
                Some(cart_id) => state.storefront().get_cart(cart_id).await,
                None => None,
            };
            CartItemsTemplate {
                cart: current.as_ref().map(CartView::from).unwrap_or_default(),
                error: Some(error.to_string()),
            }
            .into_response()
        }
    }
}

/// Get cart count badge (HTMX, polled).
#[instrument(skip(state, shopper))]
pub async fn count(State(state): State<AppState>, shopper: Shopper) -> CartCountTemplate {
    let count = match &shopper.cart_id {
        Some(cart_id) => state
            .storefront()
            .get_cart(cart_id)
            .await
            .map_or(0, |cart| cart.total_quantity),
        None => 0,
    };

    CartCountTemplate { count }
}

/// Redirect to Shopify checkout.
#[instrument(skip(state, session, shopper))]
pub async fn checkout(
    State(state): State<AppState>,
    session: Session,
    shopper: Shopper,
) -> Redirect {
    let Some(cart_id) = shopper.cart_id else {
        return Redirect::to("/cart");
    };

    match state.storefront().find_cart(&cart_id).await {
        Ok(Some(cart)) if !cart.is_empty() && !cart.checkout_url.is_empty() => {
            Redirect::to(&cart.checkout_url)
        }
        Ok(Some(_)) => Redirect::to("/cart"),
        Ok(None) => {
            // A new cart is created on the next add
            if let Err(e) = clear_cart_id(&session).await {
                tracing::error!("Failed to clear cart ID: {e}");
            }
            Redirect::to("/cart")
        }
        Err(e) => {
            tracing::warn!(error = %e, "Cart lookup failed, keeping stored cart");
            Redirect::to("/cart")
        }
    }
}
