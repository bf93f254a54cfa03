//! Run with `wasm-pack test --headless --chrome`
#![cfg(target_arch = "wasm32")]

use joia_wasm::{storage::LocalStorage, WasmCart};
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn line(product_id: u64) -> JsValue {
    let js = format!(
        r#"{{"product_id":{},"name":"Brinco","unit_price":"89.90","selected_options":{{"Material":"Prata"}}}}"#,
        product_id
    );
    json_parse(&js)
}

#[wasm_bindgen::prelude::wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = JSON, js_name = parse)]
    fn json_parse(text: &str) -> JsValue;
}

#[wasm_bindgen_test]
fn cart_survives_reload() {
    assert!(LocalStorage::from_window().is_available());

    let mut cart = WasmCart::load();
    cart.clear();
    cart.add_item(line(3)).unwrap();
    cart.add_item(line(3)).unwrap();

    let reloaded = WasmCart::load();
    assert_eq!(reloaded.count(), 2);
    assert_eq!(reloaded.subtotal_cents(), 17980);
    assert!(!reloaded.is_open());
}

#[wasm_bindgen_test]
fn malformed_item_is_rejected() {
    let mut cart = WasmCart::load();
    assert!(cart.add_item(JsValue::from_str("anel")).is_err());
}
