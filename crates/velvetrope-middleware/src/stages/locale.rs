//! Locale resolution.
//!
//! The site serves every locale from unprefixed paths, so a request
//! arriving with a locale prefix (`/en/about`) is normalized with a
//! redirect to the bare path. Otherwise the locale is resolved in
//! priority order: `NEXT_LOCALE` cookie, `Accept-Language` header,
//! configured default. A locale learned from the header is written
//! back as a cookie so the preference sticks.

use crate::context::RequestContext;
use crate::stage::{BoxFuture, Stage, StageOutcome};
use crate::types::{Request, Response, ResponseExt};
use velvetrope_config::LocaleConfig;
use velvetrope_core::{SameSite, SetCookie};

/// Cookie that pins the visitor's locale choice.
pub const LOCALE_COOKIE: &str = "NEXT_LOCALE";

/// Locale cookie lifetime: one year.
pub const LOCALE_COOKIE_TTL_SECS: u64 = 31_536_000;

/// Parses an `Accept-Language` header into language tags, best first.
///
/// Entries are ordered by their `q` weight (missing weight reads as
/// 1.0); ties keep header order. Tags are reduced to their primary
/// subtag, lowercased, so `en-US` matches the `en` locale.
fn parse_accept_language(header: &str) -> Vec<String> {
    let mut entries: Vec<(String, f32)> = header
        .split(',')
        .filter_map(|entry| {
            let mut parts = entry.split(';');
            let tag = parts.next()?.trim();
            if tag.is_empty() || tag == "*" {
                return None;
            }
            let quality = parts
                .filter_map(|param| param.trim().strip_prefix("q="))
                .find_map(|q| q.parse::<f32>().ok())
                .unwrap_or(1.0);
            let primary = tag.split('-').next().unwrap_or(tag).to_ascii_lowercase();
            Some((primary, quality))
        })
        .collect();
    entries.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    entries.into_iter().map(|(tag, _)| tag).collect()
}

/// Splits a leading supported-locale segment off `path`.
///
/// `/en/about` becomes `("en", "/about")` and `/fr` becomes
/// `("fr", "/")`; paths without a locale prefix return `None`.
fn split_locale_prefix<'a>(path: &'a str, config: &LocaleConfig) -> Option<(&'a str, String)> {
    let rest = path.strip_prefix('/')?;
    let (segment, remainder) = match rest.split_once('/') {
        Some((segment, remainder)) => (segment, format!("/{remainder}")),
        None => (rest, String::from("/")),
    };
    if config.is_supported(segment) {
        Some((segment, remainder))
    } else {
        None
    }
}

/// Stage that resolves the request locale.
#[derive(Debug, Clone)]
pub struct LocaleStage {
    config: LocaleConfig,
}

impl LocaleStage {
    /// Creates the stage from locale configuration.
    #[must_use]
    pub fn new(config: LocaleConfig) -> Self {
        Self { config }
    }

    fn locale_cookie(locale: &str) -> SetCookie {
        // Client code reads this cookie, so it is not HttpOnly.
        SetCookie::new(LOCALE_COOKIE, locale)
            .path("/")
            .max_age(LOCALE_COOKIE_TTL_SECS)
            .same_site(SameSite::Lax)
    }
}

impl Stage for LocaleStage {
    fn name(&self) -> &'static str {
        "locale"
    }

    fn apply<'a>(
        &'a self,
        ctx: &'a mut RequestContext,
        request: &'a Request,
    ) -> BoxFuture<'a, StageOutcome> {
        Box::pin(async move {
            let path = request.uri().path();

            // Locale-prefixed paths normalize to the bare path; the
            // prefix locale is pinned in the cookie so the redirected
            // request resolves to the same locale.
            if let Some((locale, stripped)) = split_locale_prefix(path, &self.config) {
                let location = match request.uri().query() {
                    Some(query) => format!("{stripped}?{query}"),
                    None => stripped,
                };
                tracing::debug!(%path, locale, %location, "normalizing locale prefix");
                ctx.cookies_mut().set(Self::locale_cookie(locale));
                return StageOutcome::Intercept(Response::redirect(&location));
            }

            if let Some(cookie) = ctx.cookies().get(LOCALE_COOKIE) {
                if self.config.is_supported(cookie) {
                    let locale = cookie.to_string();
                    ctx.set_locale(locale);
                    return StageOutcome::Continue;
                }
            }

            let header_locale = request
                .headers()
                .get("accept-language")
                .and_then(|value| value.to_str().ok())
                .and_then(|header| {
                    parse_accept_language(header)
                        .into_iter()
                        .find(|tag| self.config.is_supported(tag))
                });

            if let Some(locale) = header_locale {
                ctx.cookies_mut().set(Self::locale_cookie(&locale));
                ctx.set_locale(locale);
            } else {
                ctx.set_locale(self.config.default_locale.clone());
            }

            StageOutcome::Continue
        })
    }
}
