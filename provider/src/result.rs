use crate::ProviderError;
use serde::{
    Deserialize,
    Serialize,
};
use serde_json::{
    Map,
    Value,
};

/// Keys every successful measurement carries.
const REQUIRED_KEYS: [&str; 4] = ["timestamp", "download", "upload", "ping"];

/// One successful measurement as reported by the provider.
///
/// The record is kept as the provider's JSON object so that any of its keys, including those of
/// nested records like `server` or `client`, can be selected for the log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MeasurementResult(Map<String, Value>);

impl MeasurementResult {
    /// Parses the JSON document a provider printed.
    pub fn parse(raw: &[u8]) -> Result<Self, ProviderError> {
        let value: Value =
            serde_json::from_slice(raw).map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;
        Self::try_from(value)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_nested(&self, outer: &str, inner: &str) -> Option<&Value> {
        self.0.get(outer)?.get(inner)
    }

    /// Download speed in bits per second.
    pub fn download(&self) -> Option<f64> {
        self.get("download")?.as_f64()
    }

    /// Upload speed in bits per second.
    pub fn upload(&self) -> Option<f64> {
        self.get("upload")?.as_f64()
    }

    pub fn ping(&self) -> Option<f64> {
        self.get("ping")?.as_f64()
    }
}

impl TryFrom<Value> for MeasurementResult {
    type Error = ProviderError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let Value::Object(map) = value else {
            return Err(ProviderError::MalformedResponse(format!(
                "expected a JSON object, got {value}"
            )));
        };
        if let Some(missing) = REQUIRED_KEYS.iter().find(|key| !map.contains_key(**key)) {
            return Err(ProviderError::MalformedResponse(format!("missing key {missing:?}")));
        }
        Ok(Self(map))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SPEEDTEST_CLI_OUTPUT: &str = r#"{"download": 93847562.3187, "upload": 38271612.0392, "ping": 14.372, "server": {"url": "http://speedtest.example.net:8080/speedtest/upload.php", "lat": "52.5200", "lon": "13.4050", "name": "Berlin", "country": "Germany", "cc": "DE", "sponsor": "Example ISP", "id": "1234", "host": "speedtest.example.net:8080", "d": 3.21, "latency": 14.372}, "timestamp": "2023-01-01T12:00:00.123456Z", "bytes_sent": 48234496, "bytes_received": 117721880, "share": null, "client": {"ip": "203.0.113.7", "isp": "Example ISP"}}"#;

    #[test]
    fn parses_speedtest_cli_json() {
        let result = MeasurementResult::parse(SPEEDTEST_CLI_OUTPUT.as_bytes()).unwrap();
        assert_eq!(result.get("timestamp"), Some(&json!("2023-01-01T12:00:00.123456Z")));
        assert_eq!(result.download(), Some(93847562.3187));
        assert_eq!(result.ping(), Some(14.372));
        assert_eq!(result.get_nested("server", "name"), Some(&json!("Berlin")));
        assert_eq!(result.get_nested("server", "missing"), None);
        assert_eq!(result.get_nested("bytes_sent", "x"), None);
    }

    #[test]
    fn rejects_incomplete_records() {
        let err = MeasurementResult::try_from(json!({"download": 1.0, "upload": 1.0, "ping": 1.0})).unwrap_err();
        assert_eq!(err, ProviderError::MalformedResponse("missing key \"timestamp\"".into()));

        let err = MeasurementResult::parse(b"--json --share").unwrap_err();
        assert!(matches!(err, ProviderError::MalformedResponse(_)));

        let err = MeasurementResult::try_from(json!([1, 2])).unwrap_err();
        assert!(matches!(err, ProviderError::MalformedResponse(_)));
    }
}
