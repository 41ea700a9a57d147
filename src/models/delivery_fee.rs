use serde::Serialize;

/// A computed delivery fee in cents. Serializes as `{"delivery_fee": <cents>}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct DeliveryFee {
    pub delivery_fee: u64,
}

impl DeliveryFee {
    pub fn new(cents: u64) -> Self {
        Self { delivery_fee: cents }
    }

    pub fn cents(&self) -> u64 {
        self.delivery_fee
    }
}
