mod history_view;
mod movement_table;

pub use history_view::HistoryView;
pub use movement_table::MovementTable;

use wasm_bindgen::JsValue;

/// Locale-formatted date + time of an ISO-8601 timestamp, via the browser
/// clock like the rest of the page.
pub fn format_local(ts: &str) -> String {
    if ts.is_empty() {
        return String::new();
    }
    let date = js_sys::Date::new(&JsValue::from_str(ts));
    if date.get_time().is_nan() {
        return ts.to_string();
    }
    String::from(date.to_locale_string("es-ES", &JsValue::UNDEFINED))
}
