/// Capability of holding the application secret used to authenticate
/// outgoing telemetry.
pub trait AppSecretHolder {
    fn app_secret(&self) -> &str;
}

impl AppSecretHolder for String {
    fn app_secret(&self) -> &str {
        self
    }
}

impl AppSecretHolder for str {
    fn app_secret(&self) -> &str {
        self
    }
}
