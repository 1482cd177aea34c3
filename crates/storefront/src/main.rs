//! # Storefront Demo
//!
//! Runs one order through the whole pipeline against the configured providers (simulated when
//! none are set):
//! 1. Load `.env` and configuration, start the [`StorefrontSystem`].
//! 2. Create a customer, an operator and a product with sample sizes.
//! 3. Price a cart, place the order and walk it to `delivered`.
//!
//! ```bash
//! RUST_LOG=info cargo run -p storefront
//! ```

use resource_actor::telemetry::setup_tracing;
use rust_decimal::Decimal;
use storefront::config::StorefrontConfig;
use storefront::lifecycle::StorefrontSystem;
use storefront::model::{
    Address, CartItem, NotificationPreferences, OrderStatus, PaymentMethod, Principal,
    ProductCreate, Role, SampleOption, UserCreate,
};
use storefront::service::NotificationStatus;
use tracing::{info, warn, Instrument};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            return Err(e.into());
        }
    }
    setup_tracing();

    let config = StorefrontConfig::from_env()?;
    let system = StorefrontSystem::start(config)?;

    let customer_id = system
        .user_client
        .create_user(UserCreate {
            phone: Some("98765 43210".to_string()),
            preferences: NotificationPreferences {
                sms_notifications: true,
                whatsapp_notifications: true,
                ..NotificationPreferences::default()
            },
            ..UserCreate::customer("Asha Verma", "asha@example.com")
        })
        .await?;
    let operator = system
        .user_client
        .create_user(UserCreate {
            role: Role::Operator,
            preferences: NotificationPreferences::silent(),
            ..UserCreate::customer("Warehouse", "ops@example.com")
        })
        .await
        .map(Principal::operator)?;

    let product_id = system
        .product_client
        .create_product(ProductCreate {
            name: "Oud Nocturne".to_string(),
            brand: "Maison Ambre".to_string(),
            price: Decimal::new(1250, 0),
            stock: 20,
            samples: vec![SampleOption {
                size_ml: 5,
                price: Decimal::new(150, 0),
            }],
        })
        .await?;

    let address = Address::new("Asha Verma", "12 Lodhi Road", "New Delhi", "Delhi", "110003");
    let cart = [
        CartItem::regular(product_id, 2),
        CartItem::sample(product_id, 5, 1),
    ];

    let placed = async {
        let summary = system
            .service
            .compute_checkout_summary(&cart, &address, None)
            .await?;
        info!(
            subtotal = %summary.subtotal,
            shipping = %summary.shipping,
            tax = %summary.tax,
            total = %summary.total,
            "Checkout priced"
        );
        let placed = system
            .service
            .create_order(
                customer_id,
                summary,
                PaymentMethod::Upi,
                Some("pay_demo_001".to_string()),
            )
            .await?;
        Ok::<_, Box<dyn std::error::Error>>(placed)
    }
    .instrument(tracing::info_span!("checkout"))
    .await?;
    report(&placed.notification);

    let order_id = placed.value.id;
    for (status, tracking) in [
        (OrderStatus::Confirmed, None),
        (OrderStatus::Processing, None),
        (OrderStatus::Shipped, Some("DLV123456".to_string())),
        (OrderStatus::Delivered, None),
    ] {
        let moved = system
            .service
            .transition_order_status(order_id, status, operator, tracking)
            .await?;
        info!(order_id = %order_id, status = %moved.value.status, "Order moved");
        report(&moved.notification);
    }

    system.shutdown().await?;
    info!("Demo complete");
    Ok(())
}

fn report(status: &NotificationStatus) {
    match status {
        NotificationStatus::Delivered(result) => info!(
            success = result.success,
            attempts = result.attempts.len(),
            skipped = result.skipped.len(),
            "Customer notified"
        ),
        NotificationStatus::Queued => info!("Notification queued"),
        NotificationStatus::RecipientUnavailable(reason) => {
            warn!(%reason, "Customer not notified")
        }
        NotificationStatus::NotRequired => {}
    }
}
