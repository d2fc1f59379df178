//! Canned service key documents.

use serde_json::{Value, json};

pub const UAA_URL: &str = "https://tenant.authentication.eu10.hana.ondemand.com";
pub const ABAP_URL: &str = "https://system.abap.eu10.hana.ondemand.com";

/// Key with a nested `uaa` object and an `abap` block.
pub fn abap_service_key() -> Value {
    json!({
        "uaa": {
            "url": UAA_URL,
            "clientid": "sb-abap-client",
            "clientsecret": "abap-secret",
            "identityzone": "tenant",
            "tenantmode": "dedicated"
        },
        "abap": {
            "url": ABAP_URL,
            "client": "100",
            "language": "EN"
        },
        "url": ABAP_URL,
        "binding": {"env": "cf", "type": "oauth"}
    })
}

/// Flat XSUAA key whose root `url` is the UAA endpoint.
pub fn xsuaa_service_key() -> Value {
    json!({
        "url": "https://x.authentication.test",
        "clientid": "c",
        "clientsecret": "s",
        "abap": {"url": "https://x.abap.test", "client": "001"}
    })
}

/// Flat XSUAA key without any system URL.
pub fn bare_xsuaa_service_key() -> Value {
    json!({
        "url": UAA_URL,
        "clientid": "sb-xsuaa",
        "clientsecret": "xsuaa-secret",
        "tenantmode": "shared",
        "apiurl": "https://api.authentication.eu10.hana.ondemand.com"
    })
}

/// `{"credentials": key}`, as some tools export keys.
pub fn wrapped(key: Value) -> Value {
    json!({ "credentials": key })
}

/// `key` surrounded by the chatter a CLI prints around it.
pub fn with_banner(key: &Value) -> String {
    format!(
        "Getting key abap-key of service instance abap-trial as user@example.com...\n\n{}\n\nOK\n",
        serde_json::to_string_pretty(key).unwrap()
    )
}
