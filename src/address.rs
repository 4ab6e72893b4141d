//! Base address normalization and request URL construction.

use url::Url;

use crate::{QueryValue, RequestError, Result};

/// Default API root used when neither the environment nor the call overrides it.
pub const DEFAULT_BASE_URL: &str = "https://pokeapi.co/api/v2";

/// Bare API host without the version prefix.
const BARE_API_HOST: &str = "https://pokeapi.co";

/// Normalizes a configured base address.
///
/// Trims whitespace, rewrites the bare API host (`https://pokeapi.co` with or
/// without a trailing slash) to [`DEFAULT_BASE_URL`], and guarantees exactly
/// one trailing `/` so relative joins keep the base's path prefix.
pub fn normalize_base(raw: &str) -> String {
    let trimmed = raw.trim();
    let host_only = trimmed.strip_suffix('/').unwrap_or(trimmed);

    let mut base = if host_only.eq_ignore_ascii_case(BARE_API_HOST) {
        DEFAULT_BASE_URL.to_owned()
    } else {
        trimmed.to_owned()
    };

    if !base.ends_with('/') {
        base.push('/');
    }
    base
}

/// Builds the URL for one attempt.
///
/// Absolute `http(s)://` paths are used as-is. Anything else has its leading
/// slashes stripped and is resolved against the normalized base. Query
/// parameters use set semantics: an existing key keeps its position and takes
/// the new value, duplicates after it are dropped.
pub fn build_url(path: &str, base: &str, params: &[(String, QueryValue)]) -> Result<Url> {
    let mut url = if is_absolute(path) {
        parse(path)?
    } else {
        let base = normalize_base(base);
        let base_url = parse(&base)?;
        let cleaned = path.trim_start_matches('/');
        base_url
            .join(cleaned)
            .map_err(|source| RequestError::InvalidUrl {
                input: format!("{base}{cleaned}"),
                source,
            })?
    };

    for (key, value) in params {
        set_query_param(&mut url, key, &value.to_string());
    }
    Ok(url)
}

fn is_absolute(path: &str) -> bool {
    let lower = path.get(..8).unwrap_or(path).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

fn parse(input: &str) -> Result<Url> {
    Url::parse(input).map_err(|source| RequestError::InvalidUrl {
        input: input.to_owned(),
        source,
    })
}

fn set_query_param(url: &mut Url, key: &str, value: &str) {
    let mut pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();

    let mut seen = false;
    pairs.retain_mut(|(existing_key, existing_value)| {
        if existing_key != key {
            return true;
        }
        if seen {
            return false;
        }
        seen = true;
        *existing_value = value.to_owned();
        true
    });
    if !seen {
        pairs.push((key.to_owned(), value.to_owned()));
    }

    url.query_pairs_mut().clear().extend_pairs(pairs);
}
