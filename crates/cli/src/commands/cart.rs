//! Cart commands.
//!
//! Mutations go through [`CartStore`], which refuses them when signed out
//! and refetches the cart after every write.

use clap::Subcommand;

use haberdash_client::{CartOutcome, CartStore};
use haberdash_core::{CartLineId, ProductId};

use super::CliError;

#[derive(Subcommand)]
pub enum CartAction {
    /// Show the cart contents
    Show,
    /// Add a product to the cart
    Add {
        /// Product ID
        product_id: ProductId,

        /// Quantity to add
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Set a cart line's quantity (zero removes the line)
    Update {
        /// Cart line ID
        line_id: CartLineId,

        /// New quantity
        quantity: u32,
    },
    /// Remove a cart line
    Remove {
        /// Cart line ID
        line_id: CartLineId,
    },
    /// Remove everything from the cart
    Clear,
}

pub async fn run(action: CartAction, cart: &CartStore) -> Result<(), CliError> {
    match action {
        CartAction::Show => {
            cart.refresh().await;
            show(cart).await;
            return Ok(());
        }
        CartAction::Add { product_id, quantity } => {
            check(cart.add_item(product_id, quantity).await)?;
        }
        CartAction::Update { line_id, quantity } => {
            check(cart.update_item(line_id, quantity).await)?;
        }
        CartAction::Remove { line_id } => {
            check(cart.remove_item(line_id).await)?;
        }
        CartAction::Clear => {
            check(cart.clear().await)?;
        }
    }

    show(cart).await;
    Ok(())
}

async fn show(cart: &CartStore) {
    match cart.snapshot().await {
        Some(snapshot) if snapshot.items.is_empty() => {
            tracing::info!("Cart is empty");
        }
        Some(snapshot) => {
            for line in &snapshot.items {
                tracing::info!(
                    "  [{}] {} x{} = {}",
                    line.id,
                    line.product.name,
                    line.quantity,
                    line.subtotal
                );
            }
            tracing::info!(
                "{} item(s), total {}",
                cart.item_count().await,
                snapshot.total_price
            );
        }
        None => tracing::info!("Cart is empty"),
    }
}

fn check(outcome: CartOutcome) -> Result<(), CliError> {
    match outcome {
        CartOutcome::Updated => Ok(()),
        CartOutcome::RequiresLogin => Err(CliError::NotLoggedIn),
        CartOutcome::Failed(message) => Err(CliError::Cart(message)),
    }
}
