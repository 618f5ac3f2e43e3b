/// Names shown in full before the rest of an order is collapsed into a count.
const NAMED_ITEMS: usize = 2;

/// A short description of an order's contents for notification bodies.
///
/// The first two product names are listed and anything beyond is counted, e.g. `"Mug, Tea +3 more"`.
pub fn summarize_items<S: AsRef<str>>(names: &[S]) -> String {
    let named = names.iter().take(NAMED_ITEMS).map(AsRef::as_ref).collect::<Vec<&str>>().join(", ");
    match names.len().saturating_sub(NAMED_ITEMS) {
        0 => named,
        rest => format!("{named} +{rest} more"),
    }
}
