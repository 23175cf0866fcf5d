use crate::Alert;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    sync::{Arc, LazyLock},
};

mod common;
pub use common::*;
mod result;
use result::*;

#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    #[default]
    Text,
    Markdown,
    JSON,
}

pub type FormatFuncType = fn(Arc<Alert>) -> String;

#[derive(Debug)]
pub struct FormatFuncStruct {
    pub result_fn: FormatFuncType,
}

pub static FORMAT_FUNCS: LazyLock<HashMap<Format, FormatFuncStruct>> = LazyLock::new(|| {
    let mut m = HashMap::new();
    m.insert(Format::Text, FormatFuncStruct { result_fn: to_text });
    m.insert(
        Format::Markdown,
        FormatFuncStruct {
            result_fn: to_markdown,
        },
    );
    m.insert(Format::JSON, FormatFuncStruct { result_fn: to_json });
    m
});
