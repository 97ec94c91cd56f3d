use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// `GET /i18n/translations/{lang}` payload. Missing fields fall back to an
/// empty table and left-to-right direction.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TranslationsPayload {
    #[serde(default)]
    pub translations: HashMap<String, String>,
    #[serde(default)]
    pub is_rtl: bool,
}

/// `GET /i18n/language` payload. Only the language list is read; the
/// backend's stored preference is never applied on the client.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LanguageInfo {
    #[serde(default)]
    pub supported_languages: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SetLanguageRequest<'a> {
    pub language: &'a str,
}
