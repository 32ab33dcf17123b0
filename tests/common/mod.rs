#![allow(dead_code)]

use std::sync::OnceLock;

#[cfg(feature = "json")]
use http_double::dx::JsonClientFixture;
#[cfg(feature = "soap")]
use http_double::dx::SoapClientFixture;

pub const TARGET: &str = "https://test/index.html";

/// Message sent by the behaviour suites.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Greeting {
    pub message: String,
    pub sender: String,
}

pub fn payload() -> Greeting {
    Greeting {
        message: "hello".into(),
        sender: "integration-suite".into(),
    }
}

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[cfg(feature = "json")]
pub fn json_fixture() -> &'static JsonClientFixture {
    static FIXTURE: OnceLock<JsonClientFixture> = OnceLock::new();
    FIXTURE.get_or_init(JsonClientFixture::new)
}

#[cfg(feature = "soap")]
pub fn soap_fixture() -> &'static SoapClientFixture {
    static FIXTURE: OnceLock<SoapClientFixture> = OnceLock::new();
    FIXTURE.get_or_init(SoapClientFixture::new)
}
