// src/middleware/i18n.rs

use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};

use crate::common::i18n::DEFAULT_LANG;

// Extrator de idioma (primeira tag do Accept-Language, sem a região)
#[derive(Debug, Clone)]
pub struct Locale(pub String);

impl Locale {
    pub fn from_header(value: Option<&str>) -> Self {
        let lang = value
            .and_then(|header_str| {
                accept_language::parse(header_str)
                    .first()
                    // "pt-BR" -> "pt"
                    .map(|tag| tag.split('-').next().unwrap_or(tag.as_str()).to_lowercase())
            })
            .filter(|lang| !lang.is_empty())
            .unwrap_or_else(|| DEFAULT_LANG.to_string());

        Locale(lang)
    }
}

impl Default for Locale {
    fn default() -> Self {
        Locale(DEFAULT_LANG.to_string())
    }
}

impl<S> FromRequestParts<S> for Locale
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|value| value.to_str().ok());

        Ok(Locale::from_header(header))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn takes_the_preferred_language_without_region() {
        assert_eq!(Locale::from_header(Some("en-US,pt;q=0.8")).0, "en");
        assert_eq!(Locale::from_header(Some("pt-BR")).0, "pt");
    }

    #[test]
    fn defaults_to_portuguese() {
        assert_eq!(Locale::from_header(None).0, "pt");
        assert_eq!(Locale::from_header(Some("")).0, "pt");
    }
}
