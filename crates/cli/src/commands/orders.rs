//! Order commands.

use clap::Subcommand;

use haberdash_client::types::NewOrder;
use haberdash_client::{ApiClient, SessionStore};
use haberdash_core::OrderId;

use super::CliError;

#[derive(Subcommand)]
pub enum OrdersAction {
    /// List your orders
    List,
    /// Show one of your orders
    Show {
        /// Order ID
        id: OrderId,
    },
    /// Place an order from the current cart
    Place {
        /// Shipping address
        #[arg(long)]
        address: String,

        /// Contact phone number
        #[arg(long)]
        phone: String,
    },
}

pub async fn run(
    action: OrdersAction,
    api: &ApiClient,
    session: &SessionStore,
) -> Result<(), CliError> {
    if !session.is_authenticated() {
        return Err(CliError::NotLoggedIn);
    }

    match action {
        OrdersAction::List => {
            let orders = api.list_orders().await?;
            tracing::info!("{} order(s)", orders.len());
            for order in &orders {
                tracing::info!(
                    "  [{}] {} - {} ({})",
                    order.id,
                    order.status,
                    order.total_amount,
                    order
                        .created_at
                        .map_or_else(|| "-".to_owned(), |at| at.to_rfc3339())
                );
            }
        }
        OrdersAction::Show { id } => {
            let order = api.get_order(id).await?;
            tracing::info!("Order {} - {} - total {}", order.id, order.status, order.total_amount);
            tracing::info!("  ship to: {}, {}", order.shipping_address, order.phone_number);
            for line in &order.items {
                tracing::info!(
                    "  {} x{} @ {} = {}",
                    line.product_name,
                    line.quantity,
                    line.price,
                    line.subtotal
                );
            }
        }
        OrdersAction::Place { address, phone } => {
            let order = api
                .create_order(&NewOrder {
                    shipping_address: address,
                    phone_number: phone,
                })
                .await?;
            tracing::info!(
                "Order {} placed, total {} ({})",
                order.id,
                order.total_amount,
                order.status
            );
        }
    }
    Ok(())
}
