use gadi_core::GadiApp;

/// Environment overrides: `GADISEWA__HTTP__PORT=8080` becomes
/// `http.port = "8080"`.
pub fn load_env<R, P>(app: &GadiApp<R, P>, prefix: &str)
where
    R: Send + 'static,
    P: Send + Clone + 'static,
{
    for (key, value) in std::env::vars() {
        if let Some(stripped) = key.strip_prefix(prefix) {
            let normalized = stripped.to_lowercase().replace("__", ".");
            app.set(normalized, value);
        }
    }
}
