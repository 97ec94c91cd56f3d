// Localization: active language, translation table and text direction.
// Tables come from the backend; nothing is bundled with the client.

pub mod manager;
pub mod translate;

pub use manager::{
    FetchOrdering, LocalizationManager, LocalizationState, TextDirection, FALLBACK_LANGUAGES,
};
