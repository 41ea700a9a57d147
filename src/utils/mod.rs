pub mod price;
pub mod time;
