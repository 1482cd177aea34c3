//! # Storefront Order Fulfillment
//!
//! Checkout pricing, the order status lifecycle and multi-channel customer notifications for a
//! fragrance storefront, built on [`resource_actor`].
//!
//! - **[model]**: Users, products, carts and orders.
//! - **[pricing]**: Turns a cart and address into an [`OrderSummary`](model::OrderSummary).
//! - **[user_actor]**, **[product_actor]**, **[order_actor]**: Resource actors owning each
//!   entity; order status transitions run inside the order actor.
//! - **[clients]**: Typed clients over the actors.
//! - **[channels]**: Email, SMS and WhatsApp senders with retry and fallback.
//! - **[notify]**: Parallel fan-out to the channels plus the activity log.
//! - **[service]**: The operations callers use.
//! - **[lifecycle]**: Startup wiring and graceful shutdown.
//! - **[config]**: Environment-driven configuration.

pub mod channels;
pub mod clients;
pub mod config;
pub mod lifecycle;
pub mod model;
pub mod notify;
pub mod order_actor;
pub mod pricing;
pub mod product_actor;
pub mod service;
pub mod user_actor;
