use reqwest::Url;
use std::fmt::Display;

/// Query string builder for list endpoints.
///
/// Lists are sent as one comma-joined value (`country=US,GB`), never as repeated keys.
/// Absent values and empty lists are left out entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn value(mut self, key: &str, value: impl Display) -> Self {
        self.pairs.push((key.to_string(), value.to_string()));
        self
    }

    #[must_use]
    pub fn opt<V: Display>(self, key: &str, value: Option<V>) -> Self {
        match value {
            Some(value) => self.value(key, value),
            None => self,
        }
    }

    #[must_use]
    pub fn list<I>(self, key: &str, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Display,
    {
        let joined = values.into_iter().map(|v| v.to_string()).collect::<Vec<_>>().join(",");
        if joined.is_empty() { self } else { self.value(key, joined) }
    }

    #[must_use]
    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Appends the pairs to `url`, percent-encoding them.
    pub fn apply_to(&self, url: &mut Url) {
        if self.pairs.is_empty() {
            return;
        }
        let mut serializer = url.query_pairs_mut();
        for (key, value) in &self.pairs {
            serializer.append_pair(key, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lists_are_comma_joined() {
        let mut url = Url::parse("http://localhost/api/airports").unwrap();
        QueryParams::new().list("country", ["US", "GB"]).value("page", 2).apply_to(&mut url);
        assert_eq!(url.query(), Some("country=US%2CGB&page=2"));

        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs[0], ("country".to_string(), "US,GB".to_string()));
    }

    #[test]
    fn test_absent_and_empty_values_are_omitted() {
        let params = QueryParams::new()
            .list("include", Vec::<String>::new())
            .opt("search", None::<&str>)
            .opt("limit", Some(50));
        assert_eq!(params.pairs(), &[("limit".to_string(), "50".to_string())]);

        let mut url = Url::parse("http://localhost/api/routes").unwrap();
        QueryParams::new().apply_to(&mut url);
        assert_eq!(url.query(), None);
    }
}
