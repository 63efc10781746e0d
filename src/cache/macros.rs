/// A macro to simplify "get or compute" caching.
///
/// This macro checks if a value is present in the cache.
/// If found, it returns the cached value.
/// If not found, it awaits the provided future to compute the value,
/// stores it in the cache, and then returns the computed value.
/// Errors from the future are returned as-is and never cached.
///
/// # Arguments
/// * `$cache`: The cache instance to use. It must have `get_from_cache` and `set` methods.
/// * `$key`: The key to use for caching the value.
/// * `$ttl`: How long the stored value stays fresh (`std::time::Duration`).
/// * `$block`: The future to await if the value is not found in cache.
///
/// # Example
/// ```rust,ignore
/// let events = cached!(cache, CacheKey::NearEarthObjects(date), ttl, async move {
///     fetch_from_feed().await
/// });
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        if let Some(cached) = $cache.get_from_cache(&$key)? {
            tracing::debug!(key = %$key, "Cache hit");
            Ok(cached)
        } else {
            let value = $block.await?;
            $cache.set(&$key, &value, $ttl);
            tracing::debug!(key = %$key, "Cache miss, stored result");
            Ok(value)
        }
    }};
}
