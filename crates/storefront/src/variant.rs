//! Variant selection driven by URL query parameters.
//!
//! A product page URL such as `/product/acme-tee?color=blue&size=m` selects
//! options by lower-cased option name. The selector marks each option value
//! as available (some purchasable variant matches the current selections
//! with that value substituted) and active (it is the current selection).

use std::collections::BTreeMap;

use crate::shopify::{Product, ProductVariant};

/// Query parameters of a product page.
pub type SelectionParams = BTreeMap<String, String>;

/// Render state of one option value button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionValueState {
    /// Option value (e.g., "Blue").
    pub value: String,
    /// Whether a purchasable variant exists with this value selected.
    pub available: bool,
    /// Whether this value is the current selection.
    pub active: bool,
    /// URL selecting this value, keeping the other parameters.
    pub url: String,
}

/// One option (e.g., "Color") and the states of its values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionSelector {
    /// Option name as shown (e.g., "Color").
    pub name: String,
    /// Query parameter key (lower-cased name).
    pub key: String,
    /// Value states, in Shopify's order.
    pub values: Vec<OptionValueState>,
}

/// Whether the product needs a variant selector.
///
/// Products without options, or with a single option holding a single value
/// (Shopify's `Title` / `Default Title`), render none.
#[must_use]
pub fn has_selector(product: &Product) -> bool {
    match product.options.as_slice() {
        [] => false,
        [only] => only.values.len() > 1,
        _ => true,
    }
}

/// The variant whose every selected option matches `params`.
///
/// A product with exactly one variant always selects it.
#[must_use]
pub fn selected_variant<'a>(
    product: &'a Product,
    params: &SelectionParams,
) -> Option<&'a ProductVariant> {
    if let [only] = product.variants.as_slice() {
        return Some(only);
    }
    product.variants.iter().find(|variant| {
        variant.selected_options.iter().all(|option| {
            params
                .get(&option.name.to_lowercase())
                .is_some_and(|value| value == &option.value)
        })
    })
}

/// Selector state for every option value of `product`.
///
/// Returns an empty list when [`has_selector`] is false.
#[must_use]
pub fn option_value_states(product: &Product, params: &SelectionParams) -> Vec<OptionSelector> {
    if !has_selector(product) {
        return Vec::new();
    }

    let combinations: Vec<(bool, SelectionParams)> = product
        .variants
        .iter()
        .map(|variant| {
            let options = variant
                .selected_options
                .iter()
                .map(|option| (option.name.to_lowercase(), option.value.clone()))
                .collect();
            (variant.available_for_sale, options)
        })
        .collect();

    product
        .options
        .iter()
        .map(|option| {
            let key = option.name.to_lowercase();
            let values = option
                .values
                .iter()
                .map(|value| {
                    let mut candidate = params.clone();
                    candidate.insert(key.clone(), value.clone());

                    // Only parameters naming a real option value constrain availability
                    let constraints: Vec<(&String, &String)> = candidate
                        .iter()
                        .filter(|(name, selected)| {
                            product.options.iter().any(|o| {
                                &o.name.to_lowercase() == *name && o.values.contains(*selected)
                            })
                        })
                        .collect();

                    let available = combinations.iter().any(|(for_sale, combination)| {
                        *for_sale
                            && constraints
                                .iter()
                                .all(|(name, selected)| combination.get(*name) == Some(*selected))
                    });

                    OptionValueState {
                        value: value.clone(),
                        available,
                        active: params.get(&key) == Some(value),
                        url: product_url(&product.handle, &candidate),
                    }
                })
                .collect();

            OptionSelector {
                name: option.name.clone(),
                key,
                values,
            }
        })
        .collect()
}

/// Product page URL with the given query parameters.
#[must_use]
pub fn product_url(handle: &str, params: &SelectionParams) -> String {
    if params.is_empty() {
        return format!("/product/{handle}");
    }
    let query = params
        .iter()
        .map(|(key, value)| {
            format!(
                "{}={}",
                urlencoding::encode(key),
                urlencoding::encode(value)
            )
        })
        .collect::<Vec<_>>()
        .join("&");
    format!("/product/{handle}?{query}")
}
