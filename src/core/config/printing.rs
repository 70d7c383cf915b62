use crate::core::config::data::Config;
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

const INDENT: &[u8] = b"    ";

impl Config {
    /// Render the configuration as JSON indented by four spaces.
    pub fn to_pretty_json(&self) -> Result<String, serde_json::Error> {
        let mut buffer = Vec::new();
        let formatter = PrettyFormatter::with_indent(INDENT);
        let mut serializer = Serializer::with_formatter(&mut buffer, formatter);
        self.serialize(&mut serializer)?;
        // serde_json only ever emits valid UTF-8
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}
