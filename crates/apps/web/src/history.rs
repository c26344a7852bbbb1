use routing::history::History;
use wasm_bindgen::JsValue;

/// `window.history` and `window.location`, as route sync sees them.
#[derive(Debug, Default)]
pub struct BrowserHistory;

impl History for BrowserHistory {
    fn current_path(&self) -> String {
        web_sys::window()
            .and_then(|w| w.location().pathname().ok())
            .unwrap_or_else(|| "/".to_string())
    }

    /// Keeps the current query string, so `?skeleton=` and `?delay=` survive
    /// viewport navigation.
    fn replace(&self, path: &str) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let Ok(history) = window.history() else {
            return;
        };
        let search = window.location().search().unwrap_or_default();
        let url = with_search(path, &search);
        if let Err(err) = history.replace_state_with_url(&JsValue::NULL, "", Some(&url)) {
            web_sys::console::warn_2(&JsValue::from_str("history.replaceState failed"), &err);
        }
    }

    fn push(&self, path: &str) {
        let Some(history) = web_sys::window().and_then(|w| w.history().ok()) else {
            return;
        };
        if let Err(err) = history.push_state_with_url(&JsValue::NULL, "", Some(path)) {
            web_sys::console::warn_2(&JsValue::from_str("history.pushState failed"), &err);
        }
    }
}

/// Appends `search` unless `path` already carries its own query.
fn with_search(path: &str, search: &str) -> String {
    if search.is_empty() || path.contains('?') {
        return path.to_string();
    }
    if search.starts_with('?') {
        format!("{path}{search}")
    } else {
        format!("{path}?{search}")
    }
}
