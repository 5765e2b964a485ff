//! Cache key helpers.

/// Build a namespaced cache key from parts joined with `:`.
///
/// # Example
///
/// ```rust
/// use dropship_cache::cache_key;
///
/// let key = cache_key!("search", "phone case", 2);
/// assert_eq!(key, "search:phone case:2");
/// ```
#[macro_export]
macro_rules! cache_key {
    ($prefix:expr, $($part:expr),+ $(,)?) => {{
        let mut key = String::from($prefix);
        $(
            key.push(':');
            key.push_str(&$part.to_string());
        )+
        key
    }};
}
