use std::fmt::Display;

/// Build a cache key from a prefix and an ordered list of parameters
///
/// Parts are joined with `:`; the same inputs always produce the same key.
///
/// ```rust
/// use resale_billing::cache::generate_key;
///
/// assert_eq!(generate_key("payments", ["client", "abc"]), "payments:client:abc");
/// assert_eq!(generate_key("payments", ["all"]), "payments:all");
/// ```
pub fn generate_key<I, P>(prefix: &str, params: I) -> String
where
    I: IntoIterator<Item = P>,
    P: Display,
{
    let mut key = prefix.to_string();
    for param in params {
        key.push(':');
        key.push_str(&param.to_string());
    }
    key
}
