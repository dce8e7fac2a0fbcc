use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use crate::error::InputError;

static LEADING_SCHEME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9+.-]*://").expect("invalid leading scheme regex")
});

/// Validate caller input and turn it into an absolute http(s) URL.
///
/// Input without a scheme is treated as `https://<input>`.
pub fn normalize_target_url(input: &str) -> Result<Url, InputError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(InputError::MissingUrl);
    }

    let candidate = if LEADING_SCHEME.is_match(trimmed) {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };

    let parsed = Url::parse(&candidate).map_err(|e| InputError::MalformedUrl {
        input: trimmed.to_string(),
        reason: e.to_string(),
    })?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(InputError::UnsupportedScheme(parsed.scheme().to_string()));
    }

    match parsed.host_str() {
        Some(host) if !host.is_empty() => Ok(parsed),
        _ => Err(InputError::MalformedUrl {
            input: trimmed.to_string(),
            reason: "missing host".to_string(),
        }),
    }
}

/// Normalize a URL to its origin (scheme + host + optional port).
pub fn normalize_origin(url: &Url) -> String {
    url.origin()
        .ascii_serialization()
        .trim_end_matches('/')
        .to_string()
}

/// Resolve a well-known path such as `/robots.txt` against the URL's origin.
pub fn companion_url(url: &Url, path: &str) -> Result<Url, InputError> {
    let origin = normalize_origin(url);
    Url::parse(&format!("{}{}", origin, path)).map_err(|e| InputError::MalformedUrl {
        input: url.to_string(),
        reason: e.to_string(),
    })
}
