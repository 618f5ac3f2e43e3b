use rand::{distributions::Alphanumeric, Rng};

use crate::db_types::OrderNumber;

pub const ORDER_NUMBER_LENGTH: usize = 12;

/// Generates a fresh external order reference: 12 upper-case alphanumeric characters.
///
/// Uniqueness is enforced by the `orders.order_number` constraint. With 36^12 possible values a collision is not
/// something callers need to plan for.
pub fn new_order_number() -> OrderNumber {
    let number = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(ORDER_NUMBER_LENGTH)
        .map(|c| char::from(c).to_ascii_uppercase())
        .collect::<String>();
    OrderNumber::from(number)
}
