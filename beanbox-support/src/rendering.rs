//! Text rendering utilities for container diagnostics.
//!
//! Formats resolution paths, trims type paths, and finds near-miss bean
//! names for "did you mean?" hints.

/// Renders a resolution path as a readable string.
///
/// # Examples
/// ```
/// use beanbox_support::rendering::render_chain;
///
/// let chain = vec!["orderService", "paymentClient", "orderService"];
/// assert_eq!(render_chain(&chain), "orderService → paymentClient → orderService");
/// ```
pub fn render_chain(chain: &[impl AsRef<str>]) -> String {
    chain
        .iter()
        .map(|s| s.as_ref())
        .collect::<Vec<_>>()
        .join(" → ")
}

/// Shortens a fully qualified type name for display.
///
/// ```
/// use beanbox_support::rendering::shorten_type_name;
///
/// assert_eq!(shorten_type_name("shop::orders::OrderService"), "OrderService");
/// assert_eq!(
///     shorten_type_name("alloc::sync::Arc<shop::orders::OrderRepository>"),
///     "Arc<OrderRepository>"
/// );
/// ```
pub fn shorten_type_name(full_name: &str) -> String {
    let mut result = String::with_capacity(full_name.len());
    let mut segment = String::new();
    let mut chars = full_name.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            ':' if chars.peek() == Some(&':') => {
                chars.next();
                segment.clear();
            }
            '<' | '>' | ',' | ' ' | '[' | ']' | ';' | '&' => {
                result.push_str(&segment);
                result.push(ch);
                segment.clear();
            }
            _ => segment.push(ch),
        }
    }

    result.push_str(&segment);
    result
}

/// Returns up to `max` registered names that look like `requested`.
///
/// Names are compared case-insensitively. A candidate qualifies when one
/// name contains the other, or when their edit distance is small relative
/// to the requested name's length. Closest candidates come first; ties
/// keep the order of `available`.
///
/// ```
/// use beanbox_support::rendering::suggest_similar;
///
/// let names = ["userService", "userRepository", "mailer"];
/// assert_eq!(suggest_similar("userServise", &names, 3), vec!["userService"]);
/// assert!(suggest_similar("ledger", &names, 3).is_empty());
/// ```
pub fn suggest_similar(requested: &str, available: &[impl AsRef<str>], max: usize) -> Vec<String> {
    let wanted = requested.to_lowercase();
    let budget = (wanted.chars().count() / 3).max(1);

    let mut scored: Vec<(usize, &str)> = available
        .iter()
        .map(AsRef::as_ref)
        .filter_map(|name| {
            let candidate = name.to_lowercase();
            if candidate == wanted {
                return None;
            }
            if candidate.contains(&wanted) || wanted.contains(&candidate) {
                return Some((0, name));
            }
            let distance = edit_distance(&wanted, &candidate);
            (distance <= budget).then_some((distance, name))
        })
        .collect();

    scored.sort_by_key(|(distance, _)| *distance);
    scored
        .into_iter()
        .take(max)
        .map(|(_, name)| name.to_string())
        .collect()
}

/// Levenshtein distance over chars, single-row table.
fn edit_distance(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut row: Vec<usize> = (0..=b.len()).collect();

    for (i, ca) in a.chars().enumerate() {
        let mut diagonal = row[0];
        row[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let above = row[j + 1];
            let cost = usize::from(ca != *cb);
            row[j + 1] = (above + 1).min(row[j] + 1).min(diagonal + cost);
            diagonal = above;
        }
    }

    row[b.len()]
}
