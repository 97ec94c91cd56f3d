use crate::state::AppState;
use crate::view::Frame;

/// Header bar: app name, language selector and the signed-in user.
pub struct Header;

impl Header {
    pub fn render(state: &AppState) -> Frame {
        let localization = state.i18n.current();
        let mut frame = Frame::new(localization.direction);

        frame.push(localization.translate("app_name", &[]));

        let options = localization
            .supported_languages
            .iter()
            .map(|code| {
                let label = language_label(&localization.translate(language_key(code), &[]), code);
                if *code == localization.language {
                    format!("[{label}]")
                } else {
                    label
                }
            })
            .collect::<Vec<_>>()
            .join(" ");
        frame.push(format!(
            "{}: {}",
            localization.translate("language", &[]),
            options
        ));

        if let Some(user) = state.session.current_session().user() {
            frame.push(format!(
                "{}, {}  (logout: {})",
                localization.translate("welcome", &[]),
                user.name,
                localization.translate("logout", &[])
            ));
        }
        frame
    }
}

/// Translation key naming a language in the selector.
fn language_key(code: &str) -> &str {
    match code {
        "en" => "english",
        "ar" => "arabic",
        other => other,
    }
}

/// Falls back to the bare code when the table has no name for it.
fn language_label(translated: &str, code: &str) -> String {
    if translated == language_key(code) {
        code.to_string()
    } else {
        format!("{translated} ({code})")
    }
}
