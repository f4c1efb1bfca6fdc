use reqwest::Method;

/// Cache key derived from method, path and the sorted query parameters, so
/// two requests differing only in parameter order share an entry while any
/// difference in filter, sort or page does not.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(method: &Method, path: &str, params: &[(String, String)]) -> Self {
        let path = format!("/{}", path.trim_matches('/'));
        if params.is_empty() {
            return Self(format!("{} {}", method, path));
        }
        let mut sorted = params.to_vec();
        sorted.sort();
        let query = serde_urlencoded::to_string(&sorted).unwrap_or_else(|_| {
            sorted
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect::<Vec<_>>()
                .join("&")
        });
        Self(format!("{} {}?{}", method, path, query))
    }

    pub fn get(path: &str) -> Self {
        Self::new(&Method::GET, path, &[])
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
