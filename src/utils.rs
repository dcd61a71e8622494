use serde::{Deserialize, Deserializer, Serialize};

pub trait Json<'a> {
    type Item;

    fn from_json(s: &'a str) -> serde_json::Result<Self::Item>
    where
        <Self as Json<'a>>::Item: Deserialize<'a>,
    {
        let b: Self::Item = serde_json::from_str(s)?;
        Ok(b)
    }

    fn to_json(&self) -> serde_json::Result<String>
    where
        Self: Serialize,
    {
        let s: String = serde_json::to_string(self)?;
        Ok(s)
    }

    fn into_json(self) -> serde_json::Result<String>
    where
        Self: Serialize + Sized,
    {
        let s: String = serde_json::to_string(&self)?;
        Ok(s)
    }
}

/// Field deserializer reading an explicit `null` the same as an absent key.
/// Pair with `#[serde(default)]`.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

pub const DEFAULT_CONFIG_PATH: &'static str = "config.json";
pub const DEFAULT_GRACE_PERIOD_SECS: u64 = 10;
pub const DEFAULT_HEADER_READ_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_LOG_FILTER: &'static str = "info";

pub const API_PREFIX: &'static str = "/api/v1";

pub fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Joins host and port the way a socket address is written,
/// bracketing IPv6 literals. An empty host listens on every IPv4 interface.
pub fn join_host_port(host: &str, port: u16) -> String {
    if host.is_empty() {
        format!("0.0.0.0:{port}")
    } else if host.contains(':') && !host.starts_with('[') {
        format!("[{host}]:{port}")
    } else {
        format!("{host}:{port}")
    }
}

/// Decodes `%XX` escapes of a URI path segment.
/// Returns `None` on a truncated or non-hex escape, or if the result is not UTF-8.
pub fn percent_decode(s: &str) -> Option<String> {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'%' => {
                let hex = bytes.get(i + 1..i + 3)?;
                let hex = std::str::from_utf8(hex).ok()?;
                out.push(u8::from_str_radix(hex, 16).ok()?);
                i += 3;
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8(out).ok()
}
