//! Per-channel message text.

use super::OrderEvent;
use crate::channels::{Channel, RenderedMessage};
use crate::model::{Order, OrderStatus};
use std::fmt::Write;

/// Render `event` for `channel`. Email gets a subject and a full body, SMS a single line,
/// WhatsApp a short message with light formatting.
pub fn render(event: &OrderEvent, order: &Order, name: &str, channel: Channel) -> RenderedMessage {
    match channel {
        Channel::Email => RenderedMessage {
            subject: Some(subject(event, order)),
            body: email_body(event, order, name),
        },
        Channel::Sms => RenderedMessage {
            subject: None,
            body: format!("{}: {}", order.id, headline(event, order)),
        },
        Channel::WhatsApp => RenderedMessage {
            subject: None,
            body: format!(
                "Hi {name}, *{}*\n{}\nTotal: ₹{}",
                order.id,
                headline(event, order),
                order.total
            ),
        },
    }
}

fn subject(event: &OrderEvent, order: &Order) -> String {
    match event {
        OrderEvent::Created => format!("Order confirmed: {}", order.id),
        OrderEvent::StatusChanged { to, .. } => format!("Your order {} is now {}", order.id, to),
        OrderEvent::DeliveryFailed { .. } => format!("Delivery issue with order {}", order.id),
    }
}

fn headline(event: &OrderEvent, order: &Order) -> String {
    match event {
        OrderEvent::Created => "Thank you! Your order has been placed.".to_string(),
        OrderEvent::StatusChanged {
            to: OrderStatus::Shipped,
            ..
        } => match &order.tracking_number {
            Some(tracking) => format!("Your order has shipped. Tracking: {tracking}"),
            None => "Your order has shipped.".to_string(),
        },
        OrderEvent::StatusChanged { to, .. } => format!("Your order is now {to}."),
        OrderEvent::DeliveryFailed { reason } => {
            format!("We could not deliver your order: {reason}")
        }
    }
}

fn email_body(event: &OrderEvent, order: &Order, name: &str) -> String {
    let mut body = format!("Hi {name},\n\n{}\n\n", headline(event, order));

    for line in &order.lines {
        let _ = writeln!(
            body,
            "  {} x{}  ₹{}",
            line.name, line.quantity, line.line_total
        );
    }
    for sample in &order.samples {
        let price = if sample.is_free {
            "free".to_string()
        } else {
            format!("₹{}", sample.unit_price * rust_decimal::Decimal::from(sample.quantity))
        };
        let _ = writeln!(
            body,
            "  Sample {} {}ml x{}  {}",
            sample.product_id, sample.size_ml, sample.quantity, price
        );
    }

    let _ = writeln!(body, "\nSubtotal: ₹{}", order.subtotal);
    let _ = writeln!(body, "Shipping: ₹{}", order.shipping);
    let _ = writeln!(body, "Tax: ₹{}", order.tax);
    let _ = writeln!(body, "Total: ₹{}", order.total);
    body
}
