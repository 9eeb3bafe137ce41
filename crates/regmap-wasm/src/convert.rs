use regmap::{Leaf, Resolved};
use serde::Serialize;
use wasm_bindgen::JsValue;

#[derive(Serialize)]
pub struct ResolvedOut {
    pub offset: u64,
    pub element_size: u64,
    pub dimensions: Vec<u64>,
}

#[derive(Serialize)]
pub struct LeafOut {
    pub path: String,
    pub offset: u64,
    pub size: u64,
}

impl From<Resolved> for ResolvedOut {
    fn from(value: Resolved) -> Self {
        ResolvedOut {
            offset: value.offset,
            element_size: value.element_size,
            dimensions: value.dimensions,
        }
    }
}

impl From<Leaf<'_>> for LeafOut {
    fn from(value: Leaf<'_>) -> Self {
        LeafOut {
            path: value.path.to_string(),
            offset: value.offset,
            size: value.size(),
        }
    }
}

pub fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    // u64 offsets can exceed 2^53, so hand them over as BigInt.
    let serializer =
        serde_wasm_bindgen::Serializer::new().serialize_large_number_types_as_bigints(true);
    value
        .serialize(&serializer)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

pub fn error_to_js<E: std::fmt::Display>(e: E) -> JsValue {
    JsValue::from_str(&e.to_string())
}
