#![forbid(unsafe_code)]

//! `JsValue` ↔ [`HostValue`].

use wasm_bindgen::JsValue;
use wshim_core::HostValue;

pub(crate) fn to_host(value: &JsValue) -> HostValue {
    if let Some(flag) = value.as_bool() {
        HostValue::Bool(flag)
    } else if let Some(number) = value.as_f64() {
        HostValue::Number(number)
    } else if let Some(text) = value.as_string() {
        HostValue::Text(text)
    } else {
        HostValue::Null
    }
}

pub(crate) fn to_js(value: &HostValue) -> JsValue {
    match value {
        HostValue::Bool(flag) => JsValue::from_bool(*flag),
        HostValue::Number(number) => JsValue::from_f64(*number),
        HostValue::Text(text) => JsValue::from_str(text),
        HostValue::Null => JsValue::NULL,
    }
}
