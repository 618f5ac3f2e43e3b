mod price;

pub mod helpers;
pub mod op;

pub use price::{Price, PriceConversionError, CURRENCY_CODE};
