/// Hard validation failures raised while building a `Set-Cookie` line.
///
/// Borderline input that a browser would quietly drop (control characters, `=` in a name, `;` in
/// a value, domain or path) is not an error; see [`set_cookie`](crate::set_cookie).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CookieError {
    #[error("required value(s) missing")]
    MissingValue,

    #[error("Cookie value cannot contain '=' if the name is empty")]
    EqualsInNamelessValue,

    #[error("Cookie name and value both cannot be empty")]
    EmptyNameAndValue,

    #[error("The cookie value must not contain sequence: ', '.")]
    ReservedSequence,

    #[error("Cookie domain cannot start with \".\"")]
    DomainLeadingDot,

    #[error("Cookie domain '{domain}' must domain-match current host '{host}'")]
    DomainMismatch { domain: String, host: String },

    #[error("Cookie path must start with \"/\"")]
    PathNotAbsolute,

    #[error("Cookie expiry is not a representable date: {0}")]
    InvalidExpires(String),

    #[error("The provided value '{0}' is not a valid enum value of type CookieSameSite.")]
    InvalidSameSite(String),
}

pub type Result<T> = std::result::Result<T, CookieError>;
