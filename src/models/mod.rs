pub mod delivery_fee;
pub mod delivery_request;
