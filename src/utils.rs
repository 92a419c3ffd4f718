//! Small shared helpers.

/// Milliseconds since the Unix epoch.  Uses the JS clock in the browser and
/// chrono on native targets so pure-logic tests can call it too.
pub fn now_ms() -> f64 {
    #[cfg(target_arch = "wasm32")]
    {
        js_sys::Date::now()
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        chrono::Utc::now().timestamp_millis() as f64
    }
}

/// RFC 3339 timestamp for created_at / updated_at fields.
pub fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Fresh unique id with a readable prefix, e.g. `node-7f9c…`.
pub fn new_id(prefix: &str) -> String {
    format!("{}-{}", prefix, uuid::Uuid::new_v4())
}
