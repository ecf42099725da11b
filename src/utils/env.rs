/// Get environment variable with BILLING_ prefix, falling back to unprefixed version
///
/// Checks `BILLING_{key}` first, then `{key}`, so deployments that already
/// export plain names like `REDIS_URL` or `TELEGRAM_BOT_TOKEN` keep working.
///
/// # Examples
///
/// ```rust
/// use resale_billing::utils::get_env_with_prefix;
///
/// // Checks BILLING_LOG_LEVEL first, then LOG_LEVEL
/// let level = get_env_with_prefix("LOG_LEVEL");
/// ```
pub fn get_env_with_prefix(key: &str) -> Option<String> {
    std::env::var(format!("BILLING_{}", key))
        .or_else(|_| std::env::var(key))
        .ok()
        .filter(|v| !v.is_empty())
}

/// Parse an environment variable, ignoring values that fail to parse
pub fn parse_env_with_prefix<T: std::str::FromStr>(key: &str) -> Option<T> {
    get_env_with_prefix(key).and_then(|v| v.trim().parse().ok())
}
