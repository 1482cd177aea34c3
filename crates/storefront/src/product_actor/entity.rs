//! [`ActorEntity`] implementation for [`Product`].

use super::actions::{ProductAction, ProductActionResult};
use super::error::ProductError;
use crate::model::{Money, Product, ProductCreate, ProductId, ProductUpdate, SampleOption};
use async_trait::async_trait;
use resource_actor::ActorEntity;

fn check_price(price: Money) -> Result<(), ProductError> {
    if price.is_sign_negative() {
        return Err(ProductError::InvalidPrice(price.to_string()));
    }
    Ok(())
}

fn check_samples(samples: &[SampleOption]) -> Result<(), ProductError> {
    samples.iter().try_for_each(|s| check_price(s.price))
}

#[async_trait]
impl ActorEntity for Product {
    type Id = ProductId;
    type Create = ProductCreate;
    type Update = ProductUpdate;
    type Action = ProductAction;
    type ActionResult = ProductActionResult;
    type Context = ();
    type Error = ProductError;

    fn from_create_params(id: ProductId, params: ProductCreate) -> Result<Self, Self::Error> {
        if params.name.trim().is_empty() {
            return Err(ProductError::EmptyName);
        }
        check_price(params.price)?;
        check_samples(&params.samples)?;

        Ok(Self {
            id,
            name: params.name,
            brand: params.brand,
            price: params.price,
            stock: params.stock,
            samples: params.samples,
        })
    }

    /// Catalog edits. Orders already placed keep the prices they were created with.
    async fn on_update(
        &mut self,
        update: ProductUpdate,
        _ctx: &Self::Context,
    ) -> Result<(), Self::Error> {
        if let Some(price) = update.price {
            check_price(price)?;
            self.price = price;
        }
        if let Some(stock) = update.stock {
            self.stock = stock;
        }
        if let Some(samples) = update.samples {
            check_samples(&samples)?;
            self.samples = samples;
        }
        Ok(())
    }

    async fn handle_action(
        &mut self,
        action: ProductAction,
        _ctx: &Self::Context,
    ) -> Result<ProductActionResult, Self::Error> {
        match action {
            ProductAction::Quote => Ok(ProductActionResult::Quote(self.quote())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn params() -> ProductCreate {
        ProductCreate {
            name: "Jasmine Noir".to_string(),
            brand: "Maison Ambre".to_string(),
            price: dec!(2100),
            stock: 0,
            samples: vec![SampleOption {
                size_ml: 2,
                price: dec!(120),
            }],
        }
    }

    #[tokio::test]
    async fn quote_reflects_current_price_and_stock() {
        let mut product = Product::from_create_params(ProductId(3), params()).unwrap();
        let ProductActionResult::Quote(quote) =
            product.handle_action(ProductAction::Quote, &()).await.unwrap();
        assert!(!quote.in_stock);
        assert_eq!(quote.sample_price(2), Some(dec!(120)));
        assert_eq!(quote.sample_price(5), None);

        product
            .on_update(
                ProductUpdate {
                    price: Some(dec!(1990)),
                    stock: Some(4),
                    ..ProductUpdate::default()
                },
                &(),
            )
            .await
            .unwrap();
        let ProductActionResult::Quote(quote) =
            product.handle_action(ProductAction::Quote, &()).await.unwrap();
        assert!(quote.in_stock);
        assert_eq!(quote.price, dec!(1990));
    }

    #[test]
    fn negative_prices_are_rejected() {
        let mut bad = params();
        bad.samples[0].price = dec!(-1);
        assert!(matches!(
            Product::from_create_params(ProductId(1), bad),
            Err(ProductError::InvalidPrice(_))
        ));
    }
}
