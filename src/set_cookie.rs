//! Validation and serialization of outbound cookies.
//!
//! Implements <https://wicg.github.io/cookie-store/#set-a-cookie> with a few behaviors borrowed
//! from Chrome: borderline input is dropped without an error instead of being rejected.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use time::{
    OffsetDateTime, UtcOffset, format_description::BorrowedFormatItem,
    macros::format_description,
};
use url::Url;

use crate::error::{CookieError, Result};

pub const DEFAULT_PATH: &str = "/";

const HTTP_DATE: &[BorrowedFormatItem<'static>] = format_description!(
    "[weekday repr:short], [day] [month repr:short] [year] [hour]:[minute]:[second] GMT"
);

/// The cookie a caller wants to set, in the shape of the Cookie Store API's `CookieInit`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CookieInit {
    pub name: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<Expires>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Raw `sameSite` value; only `none`, `lax` and `strict` are accepted when setting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub same_site: Option<String>,
    #[serde(default)]
    pub http_only: bool,
}

impl CookieInit {
    pub fn new<N: Into<String>, V: Into<String>>(name: N, value: V) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_expires<E: Into<Expires>>(mut self, expires: E) -> Self {
        self.expires = Some(expires.into());
        self
    }

    #[must_use]
    pub fn with_domain<D: Into<String>>(mut self, domain: D) -> Self {
        self.domain = Some(domain.into());
        self
    }

    #[must_use]
    pub fn with_path<P: Into<String>>(mut self, path: P) -> Self {
        self.path = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_same_site<S: Into<String>>(mut self, same_site: S) -> Self {
        self.same_site = Some(same_site.into());
        self
    }

    #[must_use]
    pub fn with_http_only(mut self, http_only: bool) -> Self {
        self.http_only = http_only;
        self
    }
}

/// Either a bare name (with an optional value) or a full [`CookieInit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CookieInput {
    ByName { name: String, value: Option<String> },
    ByOptions(CookieInit),
}

impl From<CookieInit> for CookieInput {
    fn from(init: CookieInit) -> Self {
        Self::ByOptions(init)
    }
}

impl<N: Into<String>, V: Into<String>> From<(N, V)> for CookieInput {
    fn from((name, value): (N, V)) -> Self {
        Self::ByName {
            name: name.into(),
            value: Some(value.into()),
        }
    }
}

impl From<&str> for CookieInput {
    fn from(name: &str) -> Self {
        Self::ByName {
            name: name.to_owned(),
            value: None,
        }
    }
}

impl From<String> for CookieInput {
    fn from(name: String) -> Self {
        Self::ByName { name, value: None }
    }
}

/// Expiry of a cookie, as a date or as milliseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Expires {
    Timestamp(i64),
    At(#[serde(with = "time::serde::rfc3339")] OffsetDateTime),
}

impl Expires {
    fn into_date_time(self) -> Result<OffsetDateTime> {
        match self {
            Self::At(at) => Ok(at),
            Self::Timestamp(millis) => {
                OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * 1_000_000)
                    .map_err(|err| CookieError::InvalidExpires(err.to_string()))
            }
        }
    }
}

impl From<OffsetDateTime> for Expires {
    fn from(at: OffsetDateTime) -> Self {
        Self::At(at)
    }
}

impl From<i64> for Expires {
    fn from(millis: i64) -> Self {
        Self::Timestamp(millis)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CookieSameSite {
    None,
    Lax,
    Strict,
}

impl CookieSameSite {
    /// Attribute value as written into `Set-Cookie`.
    pub fn as_attribute(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Lax => "Lax",
            Self::Strict => "Strict",
        }
    }

    /// Enum value as accepted in [`CookieInit::same_site`].
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Lax => "lax",
            Self::Strict => "strict",
        }
    }
}

impl FromStr for CookieSameSite {
    type Err = CookieError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "none" => Ok(Self::None),
            "lax" => Ok(Self::Lax),
            "strict" => Ok(Self::Strict),
            other => Err(CookieError::InvalidSameSite(other.to_owned())),
        }
    }
}

impl From<CookieSameSite> for String {
    fn from(same_site: CookieSameSite) -> Self {
        same_site.as_str().to_owned()
    }
}

/// A single `Set-Cookie` directive: `Key` or `Key=value`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    key: &'static str,
    value: Option<String>,
}

impl Directive {
    fn flag(key: &'static str) -> Self {
        Self { key, value: None }
    }

    fn pair<V: Into<String>>(key: &'static str, value: V) -> Self {
        Self {
            key,
            value: Some(value.into()),
        }
    }

    pub fn key(&self) -> &str {
        self.key
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }
}

/// The ordered attributes of one serialized cookie.
///
/// The name/value pair always comes first, followed by whichever of Domain, Expires, Path,
/// Secure, HttpOnly and SameSite apply, in that order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeList {
    name: String,
    value: String,
    directives: Vec<Directive>,
}

impl AttributeList {
    fn new(name: String, value: String) -> Self {
        Self {
            name,
            value,
            directives: Vec::new(),
        }
    }

    fn push(&mut self, directive: Directive) {
        self.directives.push(directive);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn directives(&self) -> &[Directive] {
        &self.directives
    }

    /// Look up a directive by its key, e.g. `"Path"`.
    pub fn directive(&self, key: &str) -> Option<&Directive> {
        self.directives.iter().find(|d| d.key == key)
    }
}

impl fmt::Display for AttributeList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)?;
        for directive in &self.directives {
            write!(f, "; {}", directive.key)?;
            if let Some(value) = &directive.value {
                write!(f, "={value}")?;
            }
        }
        Ok(())
    }
}

/// Join an attribute list into a `Set-Cookie` header value. Performs no validation.
pub fn attrs_to_set_cookie(attrs: &AttributeList) -> String {
    attrs.to_string()
}

/// A validated cookie ready to be written out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetCookie {
    pub attributes: AttributeList,
    pub expires: Option<OffsetDateTime>,
}

impl SetCookie {
    /// Whether the cookie asks the client to drop it as of `now`.
    pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
        self.expires.is_some_and(|expires| expires < now)
    }
}

/// Validate a candidate cookie and assemble its `Set-Cookie` attributes.
///
/// Returns `Ok(None)` when the cookie should be silently ignored, which callers must treat as a
/// no-op rather than a failure. When `origin` is given, the Domain attribute must domain-match
/// its host and Secure is added for every host except `localhost`.
pub fn set_cookie<I: Into<CookieInput>>(
    input: I,
    origin: Option<&Url>,
) -> Result<Option<SetCookie>> {
    let CookieInit {
        name,
        value,
        expires,
        domain,
        path,
        same_site,
        http_only,
    } = match input.into() {
        CookieInput::ByName {
            name,
            value: Some(value),
        } => CookieInit::new(name, value),
        CookieInput::ByName { value: None, .. } => return Err(CookieError::MissingValue),
        CookieInput::ByOptions(init) => init,
    };

    if name.is_empty() && value.contains('=') {
        return Err(CookieError::EqualsInNamelessValue);
    }
    if name.is_empty() && value.is_empty() {
        return Err(CookieError::EmptyNameAndValue);
    }

    if has_control(&name) || has_control(&value) || name.contains('=') || value.contains(';') {
        tracing::debug!(name = %name.escape_debug(), "ignoring cookie with disallowed characters");
        return Ok(None);
    }

    if value.contains(", ") {
        return Err(CookieError::ReservedSequence);
    }

    let mut attrs = AttributeList::new(name, value);

    if let Some(domain) = domain.filter(|domain| !domain.is_empty()) {
        if has_control(&domain) || domain.contains(';') {
            tracing::debug!(name = %attrs.name, "ignoring cookie with disallowed domain");
            return Ok(None);
        }
        if domain.starts_with('.') {
            return Err(CookieError::DomainLeadingDot);
        }
        if let Some(host) = origin.and_then(Url::host_str)
            && !host.ends_with(&format!(".{domain}"))
        {
            return Err(CookieError::DomainMismatch {
                domain,
                host: host.to_owned(),
            });
        }
        attrs.push(Directive::pair("Domain", domain));
    }

    let expires = expires.map(Expires::into_date_time).transpose()?;
    if let Some(expires) = expires {
        attrs.push(Directive::pair("Expires", format_http_date(expires)?));
    }

    let path = path.unwrap_or_else(|| DEFAULT_PATH.to_owned());
    if !path.starts_with('/') {
        return Err(CookieError::PathNotAbsolute);
    }
    if has_control(&path) || path.contains(';') {
        tracing::debug!(name = %attrs.name, "ignoring cookie with disallowed path");
        return Ok(None);
    }
    attrs.push(Directive::pair("Path", path));

    if origin.is_some_and(|origin| origin.host_str() != Some("localhost")) {
        attrs.push(Directive::flag("Secure"));
    }

    if http_only {
        attrs.push(Directive::flag("HttpOnly"));
    }

    if let Some(same_site) = same_site {
        let same_site: CookieSameSite = same_site.parse()?;
        attrs.push(Directive::pair("SameSite", same_site.as_attribute()));
    }

    Ok(Some(SetCookie {
        attributes: attrs,
        expires,
    }))
}

/// What to delete: a cookie name, optionally scoped to the domain and path it was set with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteOptions {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl DeleteOptions {
    pub fn new<N: Into<String>>(name: N) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_domain<D: Into<String>>(mut self, domain: D) -> Self {
        self.domain = Some(domain.into());
        self
    }

    #[must_use]
    pub fn with_path<P: Into<String>>(mut self, path: P) -> Self {
        self.path = Some(path.into());
        self
    }
}

impl From<&str> for DeleteOptions {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for DeleteOptions {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl From<DeleteOptions> for CookieInit {
    /// A deletion is an empty, strict cookie that expired at the epoch.
    fn from(options: DeleteOptions) -> Self {
        Self {
            name: options.name,
            value: String::new(),
            expires: Some(Expires::At(OffsetDateTime::UNIX_EPOCH)),
            domain: options.domain,
            path: options.path,
            same_site: Some(CookieSameSite::Strict.into()),
            http_only: false,
        }
    }
}

fn has_control(s: &str) -> bool {
    s.chars().any(char::is_control)
}

fn format_http_date(at: OffsetDateTime) -> Result<String> {
    at.checked_to_offset(UtcOffset::UTC)
        .ok_or_else(|| CookieError::InvalidExpires(format!("{at} is out of range in UTC")))?
        .format(HTTP_DATE)
        .map_err(|err| CookieError::InvalidExpires(err.to_string()))
}
