//! Custom actions for the Product actor.

/// Product operations beyond create/read/update.
#[derive(Debug, Clone)]
pub enum ProductAction {
    /// Current price, stock flag and sample sizes, read inside the actor.
    Quote,
}

/// Results from ProductActions, one variant per action.
#[derive(Debug, Clone)]
pub enum ProductActionResult {
    Quote(crate::model::ProductQuote),
}
