//! Cart commands.
//!
//! Every command opens a store over the configured storage file and catalog
//! API, performs one operation and logs the resulting cart.
//!
//! # Environment Variables
//!
//! - `ROCKETSHOES_API_URL` - Catalog/stock API base URL
//! - `ROCKETSHOES_STORAGE_PATH` - Cart storage file

use std::process::ExitCode;

use rocketshoes_cart::{
    CartConfig, CartStore, FileStorage, HttpCatalog, MutationOutcome, TracingNotifier,
};
use rocketshoes_core::{Cart, CurrencyCode, ProductId};
use tracing::{info, warn};

type Store = CartStore<HttpCatalog, FileStorage, TracingNotifier>;

/// Restore the cart without contacting the stock ledger.
fn hydrate(config: &CartConfig) -> Result<Store, Box<dyn std::error::Error>> {
    let catalog = HttpCatalog::new(config)?;
    let storage = FileStorage::new(&config.storage_path);
    Ok(CartStore::hydrate(catalog, storage, TracingNotifier))
}

/// Restore the cart and load the stock snapshot.
async fn initialize(config: &CartConfig) -> Result<Store, Box<dyn std::error::Error>> {
    let mut store = hydrate(config)?;
    store.load_stock().await;
    Ok(store)
}

/// Log the cart lines and subtotal.
fn log_cart(cart: &Cart) {
    let currency = CurrencyCode::default();

    if cart.is_empty() {
        info!("Cart is empty");
        return;
    }

    for item in cart.items() {
        info!(
            "  [{}] {} x{} @ {} = {}",
            item.id(),
            item.product.title,
            item.amount,
            item.product.price,
            item.line_total(currency)
        );
    }
    info!(
        "{} products, {} units, subtotal {}",
        cart.len(),
        cart.total_quantity(),
        cart.subtotal(currency)
    );
}

/// Turn an operation outcome into an exit code.
///
/// Rejections were already reported to the shopper; they are logged as
/// warnings and only change the exit code.
fn finish(cart: &Cart, outcome: MutationOutcome) -> ExitCode {
    match outcome {
        MutationOutcome::Applied => {
            info!("Cart updated");
            log_cart(cart);
            ExitCode::SUCCESS
        }
        MutationOutcome::Ignored => {
            info!("Nothing to change");
            ExitCode::SUCCESS
        }
        MutationOutcome::Rejected(err) => {
            warn!(error = %err, "Cart unchanged");
            ExitCode::FAILURE
        }
    }
}

/// Show cart contents.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be built.
pub fn show(config: &CartConfig) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let store = hydrate(config)?;
    log_cart(store.cart());
    Ok(ExitCode::SUCCESS)
}

/// Show the stock snapshot.
///
/// # Errors
///
/// Returns an error if the snapshot cannot be fetched.
pub async fn stock(config: &CartConfig) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let store = initialize(config).await?;
    if !store.is_stock_loaded() {
        return Err("stock snapshot unavailable".into());
    }

    for entry in store.stock().entries() {
        let in_cart = store.cart().get(entry.id).map_or(0, |item| item.amount);
        info!(
            "  [{}] available {} (in cart {})",
            entry.id,
            entry.available_amount(),
            in_cart
        );
    }
    Ok(ExitCode::SUCCESS)
}

/// Add one unit of a product.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be built.
pub async fn add(
    config: &CartConfig,
    id: ProductId,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let mut store = initialize(config).await?;
    let outcome = store.add_product(id).await;
    Ok(finish(store.cart(), outcome))
}

/// Remove a product.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be built.
pub fn remove(config: &CartConfig, id: ProductId) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let mut store = hydrate(config)?;
    let outcome = store.remove_product(id);
    Ok(finish(store.cart(), outcome))
}

/// Set a product's amount.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be built.
pub async fn set(
    config: &CartConfig,
    id: ProductId,
    amount: i32,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let mut store = initialize(config).await?;
    let outcome = store.update_product_amount(id, amount);
    Ok(finish(store.cart(), outcome))
}

#[cfg(test)]
mod tests {
    use rocketshoes_cart::{CartError, CartOperation};

    use super::*;

    #[test]
    fn test_rejection_exits_with_failure_without_error() {
        let outcome = MutationOutcome::Rejected(CartError::ItemNotInCart {
            product_id: ProductId::new(99),
            operation: CartOperation::Remove,
        });
        assert_eq!(finish(&Cart::new(), outcome), ExitCode::FAILURE);
    }

    #[test]
    fn test_applied_and_ignored_exit_successfully() {
        assert_eq!(finish(&Cart::new(), MutationOutcome::Applied), ExitCode::SUCCESS);
        assert_eq!(finish(&Cart::new(), MutationOutcome::Ignored), ExitCode::SUCCESS);
    }
}
