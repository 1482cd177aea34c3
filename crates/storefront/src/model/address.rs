use serde::{Deserialize, Serialize};

/// A postal address as entered at checkout.
///
/// Only shape is stored here; [`crate::pricing::validate_address`] decides whether it is
/// complete enough to price and ship an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub full_name: String,
    pub line1: String,
    #[serde(default)]
    pub line2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    /// Contact number for the courier. Also used for SMS/WhatsApp when the profile has none.
    #[serde(default)]
    pub phone: Option<String>,
}

impl Address {
    pub fn new(
        full_name: impl Into<String>,
        line1: impl Into<String>,
        city: impl Into<String>,
        state: impl Into<String>,
        postal_code: impl Into<String>,
    ) -> Self {
        Self {
            full_name: full_name.into(),
            line1: line1.into(),
            line2: None,
            city: city.into(),
            state: state.into(),
            postal_code: postal_code.into(),
            phone: None,
        }
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }
}
