/// Read-through caching around an async block.
///
/// Returns the cached value when `$key` is present; otherwise awaits `$block`,
/// queues the result for a background write with `$ttl` seconds to live, and
/// returns it. Errors from the lookup or the block propagate with `?`.
///
/// # Example
/// ```rust,ignore
/// let catalog: Vec<MediaEntry> = cached!(cache, key, SEASON_CACHE_TTL, async move {
///     fetch_catalog().await
/// })?;
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        if let Some(cached) = $cache.get_from_cache(&$key).await? {
            Ok(cached)
        } else {
            let value = $block.await?;
            $cache.set_in_background(&$key, &value, $ttl);
            Ok(value)
        }
    }};
}
