//! Cache Key Module
//!
//! Deterministic keys derived from request shape, grouped under namespaces so
//! that a whole resource family can be invalidated by literal prefix.
//!
//! Rendered form:
//!
//! ```text
//! <namespace>:<discriminator>:<METHOD>:<path>?<name=value&...>
//! ```
//!
//! Every variable component is form-urlencoded, so `:`, `?`, `&`, `=` and `~`
//! never appear raw inside one. `~` stands for "no discriminator".

use std::borrow::Cow;
use std::fmt;

use axum::http::{Method, Uri};
use url::form_urlencoded;

const NO_DISCRIMINATOR: &str = "~";

// == Cache Namespace ==
/// Resource family a key belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheNamespace {
    /// Petition listings
    Petitions,
    /// A single petition, by id or slug
    Petition,
    /// Category listings
    Categories,
    /// Signatures of one user
    UserSignatures,
    /// Any other leading path segment
    Other(String),
}

impl CacheNamespace {
    /// Token written at the start of every key in this namespace.
    pub fn token(&self) -> Cow<'static, str> {
        match self {
            CacheNamespace::Petitions => Cow::Borrowed("petitions"),
            CacheNamespace::Petition => Cow::Borrowed("petition"),
            CacheNamespace::Categories => Cow::Borrowed("categories"),
            CacheNamespace::UserSignatures => Cow::Borrowed("user-signatures"),
            // `~` keeps fallback tokens apart from the named ones
            CacheNamespace::Other(segment) => Cow::Owned(format!("other~{}", encode(segment))),
        }
    }
}

// == Cache Prefix ==
/// A literal key prefix used for invalidation. Always non-empty and
/// terminated by `:`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CachePrefix(String);

impl CachePrefix {
    /// Every key of a namespace, e.g. `petitions:`.
    pub fn namespace(namespace: CacheNamespace) -> Self {
        Self(format!("{}:", namespace.token()))
    }

    /// Every key of one resource within a namespace, e.g. `petition:my-slug:`.
    pub fn resource(namespace: CacheNamespace, discriminator: &str) -> Self {
        Self(format!("{}:{}:", namespace.token(), encode(discriminator)))
    }

    /// Wraps an already-rendered prefix. Returns `None` for an empty string.
    pub fn raw(prefix: impl Into<String>) -> Option<Self> {
        let prefix = prefix.into();
        if prefix.is_empty() {
            None
        } else {
            Some(Self(prefix))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn matches(&self, key: &CacheKey) -> bool {
        key.as_str().starts_with(&self.0)
    }
}

impl fmt::Display for CachePrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// == Cache Request ==
/// The request shape the cache cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
}

impl CacheRequest {
    pub fn new<I, K, V>(method: Method, path: impl Into<String>, query: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            method,
            path: path.into(),
            query: query.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }

    /// Builds a request from a method and URI, decoding the raw query string.
    pub fn from_uri(method: Method, uri: &Uri) -> Self {
        let query = uri
            .query()
            .map(|raw| {
                form_urlencoded::parse(raw.as_bytes())
                    .into_owned()
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();

        Self {
            method,
            path: uri.path().to_string(),
            query,
        }
    }

    /// Only GET responses are cached.
    pub fn is_cacheable(&self) -> bool {
        self.method == Method::GET
    }

    /// First value of a query parameter.
    pub fn query_value(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

// == Cache Key ==
/// A rendered cache key together with the namespace it was filed under.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    namespace: CacheNamespace,
    discriminator: Option<String>,
    rendered: String,
}

impl CacheKey {
    // == Build ==
    /// Derives the key for `method path?query`.
    ///
    /// Query pairs are sorted by name then value, so reordering parameters
    /// yields the same key. Repeated names are kept.
    pub fn build<'a, I>(method: &Method, path: &str, query: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let decoded: Vec<Cow<'_, str>> = segments.iter().map(|s| decode_segment(s)).collect();
        let decoded: Vec<&str> = decoded.iter().map(|s| s.as_ref()).collect();
        let (namespace, discriminator) = classify(&decoded);

        let mut pairs: Vec<(&str, &str)> = query.into_iter().collect();
        pairs.sort_unstable();
        let query = pairs
            .iter()
            .map(|(k, v)| format!("{}={}", encode(k), encode(v)))
            .collect::<Vec<_>>()
            .join("&");

        let normalized_path = format!("/{}", segments.join("/"));
        let rendered = format!(
            "{}:{}:{}:{}?{}",
            namespace.token(),
            discriminator
                .as_deref()
                .map(encode)
                .unwrap_or_else(|| NO_DISCRIMINATOR.to_string()),
            method.as_str(),
            encode(&normalized_path),
            query
        );

        Self {
            namespace,
            discriminator,
            rendered,
        }
    }

    /// Key for a [`CacheRequest`].
    pub fn for_request(request: &CacheRequest) -> Self {
        Self::build(
            &request.method,
            &request.path,
            request.query.iter().map(|(k, v)| (k.as_str(), v.as_str())),
        )
    }

    pub fn namespace(&self) -> &CacheNamespace {
        &self.namespace
    }

    pub fn discriminator(&self) -> Option<&str> {
        self.discriminator.as_deref()
    }

    pub fn as_str(&self) -> &str {
        &self.rendered
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.rendered)
    }
}

/// Percent-decodes a path segment so discriminators match the values
/// handlers see through `Path` extraction. Invalid UTF-8 is kept raw.
fn decode_segment(raw: &str) -> Cow<'_, str> {
    urlencoding::decode(raw).unwrap_or(Cow::Borrowed(raw))
}

/// Maps decoded path segments to a namespace and optional discriminator.
fn classify(segments: &[&str]) -> (CacheNamespace, Option<String>) {
    match segments {
        ["petitions"] => (CacheNamespace::Petitions, None),
        ["petitions", id, ..] => (CacheNamespace::Petition, Some(id.to_string())),
        ["petition", slug, ..] => (CacheNamespace::Petition, Some(slug.to_string())),
        ["categories", ..] => (CacheNamespace::Categories, None),
        ["users", user, "signatures", ..] => {
            (CacheNamespace::UserSignatures, Some(user.to_string()))
        }
        [first, ..] => (CacheNamespace::Other(first.to_string()), None),
        [] => (CacheNamespace::Other(String::new()), None),
    }
}

fn encode(component: &str) -> String {
    form_urlencoded::byte_serialize(component.as_bytes()).collect()
}
