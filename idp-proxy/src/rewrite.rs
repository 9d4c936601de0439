//! `redirect_uri` substitution for the authorize and token legs.

use url::form_urlencoded;

/// Name of the parameter the proxy always overrides
pub const REDIRECT_URI: &str = "redirect_uri";

/// Query or form parameters in the order they were received.
///
/// Repeated keys are kept as separate pairs, so multi-valued parameters survive a
/// round trip through the proxy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterBag(Vec<(String, String)>);

impl ParameterBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses `application/x-www-form-urlencoded` input, a query string or a raw body
    pub fn parse(encoded: impl AsRef<[u8]>) -> Self {
        Self(
            form_urlencoded::parse(encoded.as_ref())
                .into_owned()
                .collect(),
        )
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.push((key.into(), value.into()));
    }

    /// First value for `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// All values for `key`, in order
    pub fn get_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.0
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// True when `key` is present with at least one non-empty value
    pub fn has_non_empty(&self, key: &str) -> bool {
        self.get_all(key).any(|value| !value.is_empty())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Serializes the pairs as `application/x-www-form-urlencoded`
    pub fn to_form_string(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.iter())
            .finish()
    }
}

impl From<Vec<(String, String)>> for ParameterBag {
    fn from(pairs: Vec<(String, String)>) -> Self {
        Self(pairs)
    }
}

impl FromIterator<(String, String)> for ParameterBag {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Replaces every `redirect_uri` in `params` with a single `override_redirect_uri`.
///
/// All other pairs keep their order, value and multiplicity. The substituted
/// `redirect_uri` is appended last.
pub fn rewrite(params: ParameterBag, override_redirect_uri: &str) -> ParameterBag {
    let mut rewritten: ParameterBag = params
        .0
        .into_iter()
        .filter(|(key, _)| key != REDIRECT_URI)
        .collect();
    rewritten.push(REDIRECT_URI, override_redirect_uri);
    rewritten
}

/// Appends an encoded query to `base`, the way the relays build their `Location` headers.
///
/// A base without a query always gets a `?`, even for an empty bag. A base that
/// already carries a query is extended with `&`.
pub fn append_query(base: &str, params: &ParameterBag) -> String {
    let query = params.to_form_string();
    match base.split_once('?') {
        None => format!("{base}?{query}"),
        Some(_) if query.is_empty() => base.to_string(),
        Some((_, existing)) if existing.is_empty() || existing.ends_with('&') => {
            format!("{base}{query}")
        }
        Some(_) => format!("{base}&{query}"),
    }
}
