mod item_summary;
mod order_number;

pub use item_summary::summarize_items;
pub use order_number::{new_order_number, ORDER_NUMBER_LENGTH};
