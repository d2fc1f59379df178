//! Service key parsers
//!
//! Two JSON shapes are accepted:
//!
//! ```text
//! ABAP:   { "uaa": { "url", "clientid", "clientsecret", ... }, "abap"?: {...}, ... }
//! XSUAA:  { "url", "clientid", "clientsecret", "abap"?, "sap_url"?, "client"?, ... }
//! ```
//!
//! Detection tries each format in [`ServiceKeyFormat::ALL`] order and
//! uses the first whose predicate matches. The ABAP predicate is the more
//! specific one so it goes first.

use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::schema::{AbapSection, ServiceKey, UaaCredentials};

const UAA: &str = "uaa";
const ABAP: &str = "abap";
const UAA_FIELDS: [&str; 3] = ["url", "clientid", "clientsecret"];

/// A service key shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceKeyFormat {
    /// Nested `uaa` object
    Abap,
    /// Flat OAuth client at the root
    Xsuaa,
}

impl ServiceKeyFormat {
    /// Every format, in detection priority order.
    pub const ALL: [ServiceKeyFormat; 2] = [Self::Abap, Self::Xsuaa];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Abap => "ABAP",
            Self::Xsuaa => "XSUAA",
        }
    }

    /// Short description of the JSON shape, used in mismatch errors.
    pub fn shape(&self) -> &'static str {
        match self {
            Self::Abap => "ABAP (nested \"uaa\" object)",
            Self::Xsuaa => "XSUAA (root \"url\", \"clientid\", \"clientsecret\" without \"uaa\")",
        }
    }

    pub fn parser(&self) -> &'static dyn ServiceKeyParser {
        match self {
            Self::Abap => &AbapServiceKeyParser,
            Self::Xsuaa => &XsuaaServiceKeyParser,
        }
    }

    /// First format whose predicate accepts `raw`.
    pub fn detect(raw: &Value) -> Option<Self> {
        Self::ALL.into_iter().find(|format| format.parser().can_parse(raw))
    }
}

impl std::fmt::Display for ServiceKeyFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Predicate/parse pair for one service key shape.
pub trait ServiceKeyParser: Send + Sync {
    fn format(&self) -> ServiceKeyFormat;

    /// Whether `raw` has this parser's shape.
    fn can_parse(&self, raw: &Value) -> bool;

    /// Normalize `raw` into the canonical shape.
    fn parse(&self, raw: &Value) -> Result<ServiceKey>;
}

/// Parses keys that carry a nested `uaa` object.
#[derive(Debug, Clone, Copy, Default)]
pub struct AbapServiceKeyParser;

impl ServiceKeyParser for AbapServiceKeyParser {
    fn format(&self) -> ServiceKeyFormat {
        ServiceKeyFormat::Abap
    }

    fn can_parse(&self, raw: &Value) -> bool {
        raw.get(UAA).is_some_and(Value::is_object)
    }

    fn parse(&self, raw: &Value) -> Result<ServiceKey> {
        let mut fields = as_object(raw)?.clone();
        let mut uaa = match fields.remove(UAA) {
            Some(Value::Object(uaa)) => uaa,
            _ => Map::new(),
        };

        let missing: Vec<String> = UAA_FIELDS
            .iter()
            .filter(|name| non_empty_str(&uaa, name).is_none())
            .map(|name| format!("{UAA}.{name}"))
            .collect();
        if !missing.is_empty() {
            return Err(Error::MissingFields {
                format: self.format().name().to_string(),
                fields: missing,
            });
        }

        let [url, clientid, clientsecret] = UAA_FIELDS.map(|name| take_string(&mut uaa, name));
        let abap = take_abap(&mut fields);

        tracing::debug!(format = %self.format(), "Parsed service key");
        Ok(ServiceKey {
            uaa: UaaCredentials {
                url,
                clientid,
                clientsecret,
                extra: uaa,
            },
            abap,
            fields,
        })
    }
}

/// Parses keys with the OAuth client flattened at the root.
///
/// The root `url` is the UAA endpoint. `apiurl` and the SAP attributes
/// pass through untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct XsuaaServiceKeyParser;

impl ServiceKeyParser for XsuaaServiceKeyParser {
    fn format(&self) -> ServiceKeyFormat {
        ServiceKeyFormat::Xsuaa
    }

    fn can_parse(&self, raw: &Value) -> bool {
        let Some(map) = raw.as_object() else {
            return false;
        };
        !map.contains_key(UAA) && UAA_FIELDS.iter().all(|name| non_empty_str(map, name).is_some())
    }

    fn parse(&self, raw: &Value) -> Result<ServiceKey> {
        if !self.can_parse(raw) {
            return Err(Error::FormatMismatch {
                expected: self.format().shape().to_string(),
            });
        }

        let mut fields = as_object(raw)?.clone();
        // `url` stays visible at the root as well: it is the fallback
        // system URL when nothing more specific exists.
        let url = non_empty_str(&fields, "url").unwrap_or_default().to_string();
        let clientid = take_string(&mut fields, "clientid");
        let clientsecret = take_string(&mut fields, "clientsecret");
        let abap = take_abap(&mut fields);

        tracing::debug!(format = %self.format(), "Parsed service key");
        Ok(ServiceKey {
            uaa: UaaCredentials {
                url,
                clientid,
                clientsecret,
                extra: Map::new(),
            },
            abap,
            fields,
        })
    }
}

/// Detect the shape of `raw` and parse it.
///
/// `raw` is expected to have had any `credentials` wrapper and banner text
/// removed already (the JSON loader does both).
pub fn parse_service_key(raw: &Value) -> Result<ServiceKey> {
    as_object(raw)?;

    match ServiceKeyFormat::detect(raw) {
        Some(format) => format.parser().parse(raw),
        None => {
            let expected = ServiceKeyFormat::ALL
                .iter()
                .map(ServiceKeyFormat::shape)
                .collect::<Vec<_>>()
                .join(" or ");
            Err(Error::FormatMismatch { expected })
        }
    }
}

fn as_object(raw: &Value) -> Result<&Map<String, Value>> {
    raw.as_object().ok_or_else(|| Error::NotAnObject {
        found: json_type_name(raw).to_string(),
    })
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn non_empty_str<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    map.get(key).and_then(Value::as_str).filter(|s| !s.is_empty())
}

fn take_string(map: &mut Map<String, Value>, key: &str) -> String {
    match map.remove(key) {
        Some(Value::String(s)) => s,
        _ => String::new(),
    }
}

/// Lift the `abap` block out of `fields`. A block that is not an object
/// stays where it was.
fn take_abap(fields: &mut Map<String, Value>) -> Option<AbapSection> {
    let raw = fields.get(ABAP)?.clone();
    match serde_json::from_value::<AbapSection>(raw) {
        Ok(section) => {
            fields.remove(ABAP);
            Some(section)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Ignoring malformed abap section in service key");
            None
        }
    }
}
