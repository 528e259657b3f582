//! Customer reshaping.

use crate::shopify::types::{Customer, CustomerUserError, Order};

use super::super::schema::{RawCustomer, RawCustomerUserError, RawOrder};
use super::connection::remove_edges_and_nodes;
use super::products::reshape_money;

/// Reshape a customer and their orders.
pub fn reshape_customer(customer: RawCustomer) -> Customer {
    Customer {
        id: customer.id,
        first_name: customer.first_name,
        last_name: customer.last_name,
        email: customer.email,
        phone: customer.phone,
        orders: remove_edges_and_nodes(customer.orders)
            .into_iter()
            .map(reshape_order)
            .collect(),
    }
}

fn reshape_order(order: RawOrder) -> Order {
    Order {
        id: order.id,
        name: order.name,
        order_number: order.order_number,
        processed_at: order.processed_at,
        financial_status: order.financial_status,
        fulfillment_status: order.fulfillment_status,
        total: reshape_money(order.current_total_price),
    }
}

/// Convert customer mutation errors.
pub fn reshape_customer_user_errors(errors: Vec<RawCustomerUserError>) -> Vec<CustomerUserError> {
    errors
        .into_iter()
        .map(|error| CustomerUserError {
            code: error.code,
            field: error.field.unwrap_or_default(),
            message: error.message,
        })
        .collect()
}
