//! Cart reshaping.

use crate::shopify::types::{Cart, CartCost, CartLine, CartMerchandise, CartProduct, Money};

use super::super::schema::{RawCart, RawCartLine};
use super::connection::remove_edges_and_nodes;
use super::products::{reshape_image, reshape_money, reshape_selected_option};

/// Reshape a raw cart.
///
/// A missing `totalTaxAmount` becomes zero in the currency of the cart
/// total. Line totals are taken as Shopify computed them.
pub fn reshape_cart(cart: RawCart) -> Cart {
    let total_amount = reshape_money(cart.cost.total_amount);
    let total_tax_amount = cart.cost.total_tax_amount.map_or_else(
        || Money::zero(&total_amount.currency_code),
        reshape_money,
    );

    Cart {
        id: cart.id,
        checkout_url: cart.checkout_url,
        cost: CartCost {
            subtotal_amount: reshape_money(cart.cost.subtotal_amount),
            total_amount,
            total_tax_amount,
        },
        lines: remove_edges_and_nodes(cart.lines)
            .into_iter()
            .map(reshape_cart_line)
            .collect(),
        total_quantity: cart.total_quantity,
    }
}

fn reshape_cart_line(line: RawCartLine) -> CartLine {
    let merchandise = line.merchandise;
    let product = merchandise.product;
    CartLine {
        id: line.id,
        quantity: line.quantity,
        total_amount: reshape_money(line.cost.total_amount),
        merchandise: CartMerchandise {
            id: merchandise.id,
            title: merchandise.title,
            selected_options: merchandise
                .selected_options
                .into_iter()
                .map(reshape_selected_option)
                .collect(),
            product: CartProduct {
                featured_image: product
                    .featured_image
                    .map(|image| reshape_image(image, &product.title)),
                id: product.id,
                handle: product.handle,
                title: product.title,
            },
        },
    }
}
