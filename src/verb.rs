//! HTTP verb tokens. Comparison is case-insensitive; tokens are stored uppercase.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

#[derive(Clone, Debug, Eq)]
pub struct Verb(Cow<'static, str>);

impl Verb {
    pub const GET: Verb = Verb(Cow::Borrowed("GET"));
    pub const POST: Verb = Verb(Cow::Borrowed("POST"));
    pub const PUT: Verb = Verb(Cow::Borrowed("PUT"));
    pub const DELETE: Verb = Verb(Cow::Borrowed("DELETE"));
    pub const HEAD: Verb = Verb(Cow::Borrowed("HEAD"));
    pub const PATCH: Verb = Verb(Cow::Borrowed("PATCH"));
    pub const MERGE: Verb = Verb(Cow::Borrowed("MERGE"));
    pub const OPTIONS: Verb = Verb(Cow::Borrowed("OPTIONS"));

    const KNOWN: [Verb; 8] = [
        Verb::GET,
        Verb::POST,
        Verb::PUT,
        Verb::DELETE,
        Verb::HEAD,
        Verb::PATCH,
        Verb::MERGE,
        Verb::OPTIONS,
    ];

    /// Well-known tokens resolve to the shared constants; anything else is uppercased.
    pub fn new(token: &str) -> Result<Self, ConfigError> {
        let token = token.trim();
        if token.is_empty() || token.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(ConfigError::InvalidArgument(format!("invalid verb token '{}'", token)));
        }
        if let Some(known) = Self::KNOWN.iter().find(|v| v.0.eq_ignore_ascii_case(token)) {
            return Ok(known.clone());
        }
        Ok(Verb(Cow::Owned(token.to_uppercase())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Everything except GET, HEAD, DELETE and OPTIONS may carry a model in its body.
    pub fn carries_body(&self) -> bool {
        ![Verb::GET, Verb::HEAD, Verb::DELETE, Verb::OPTIONS].contains(self)
    }

    pub fn is_standard(&self) -> bool {
        *self == Verb::GET || *self == Verb::POST || *self == Verb::PUT || *self == Verb::DELETE
    }
}

impl PartialEq for Verb {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl std::hash::Hash for Verb {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        for b in self.0.bytes() {
            state.write_u8(b.to_ascii_uppercase());
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Verb {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Verb::new(s)
    }
}

impl From<&axum::http::Method> for Verb {
    fn from(method: &axum::http::Method) -> Self {
        // http::Method never holds an empty or whitespace token
        Verb::new(method.as_str()).unwrap_or_else(|_| Verb(Cow::Owned(method.as_str().to_uppercase())))
    }
}

/// Joins verbs for `Allow` style headers.
pub fn join_verbs<'a>(verbs: impl IntoIterator<Item = &'a Verb>) -> String {
    verbs.into_iter().map(Verb::as_str).collect::<Vec<_>>().join(", ")
}
