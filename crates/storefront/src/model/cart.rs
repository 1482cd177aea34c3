use crate::model::ProductId;
use serde::{Deserialize, Serialize};

/// What a cart line buys: the full product or one of its trial sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum LineKind {
    Regular,
    Sample { size_ml: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: ProductId,
    pub quantity: u32,
    #[serde(flatten)]
    pub kind: LineKind,
}

impl CartItem {
    pub fn regular(product_id: ProductId, quantity: u32) -> Self {
        Self {
            product_id,
            quantity,
            kind: LineKind::Regular,
        }
    }

    pub fn sample(product_id: ProductId, size_ml: u32, quantity: u32) -> Self {
        Self {
            product_id,
            quantity,
            kind: LineKind::Sample { size_ml },
        }
    }

    pub fn is_sample(&self) -> bool {
        matches!(self.kind, LineKind::Sample { .. })
    }
}
