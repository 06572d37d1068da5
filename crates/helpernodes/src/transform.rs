use crate::document;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use helpercore::{FieldType, Node, NodeContext, NodeError, NodeOutput, NodeSchema, Value};
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Reads the property named by the `key` option from `target`
#[derive(Default)]
pub struct PropertyNode;

#[async_trait]
impl Node for PropertyNode {
    fn schema(&self) -> NodeSchema {
        NodeSchema::new()
            .with_input("target", FieldType::Any)
            .with_output("value", FieldType::Any)
            .with_option("key")
    }

    async fn process(&self, ctx: NodeContext) -> Result<NodeOutput, NodeError> {
        let target = ctx.require_input("target")?;
        Ok(NodeOutput::new().with_output("value", property(target, ctx.option("key"))))
    }
}

/// Property lookup; anything without the property reads as null
pub fn property(target: &Value, key: &str) -> Value {
    match target {
        Value::Element(element) => document::element_property(element, key),
        Value::Object(map) => map.get(key).cloned().unwrap_or(Value::Null),
        Value::Array(items) if key == "length" => Value::Number(items.len() as f64),
        Value::Array(items) => key.parse::<usize>()
            .ok()
            .and_then(|i| items.get(i).cloned())
            .unwrap_or(Value::Null),
        Value::String(s) if key == "length" => Value::Number(s.chars().count() as f64),
        Value::String(s) => key.parse::<usize>()
            .ok()
            .and_then(|i| s.chars().nth(i))
            .map(|c| Value::String(c.to_string()))
            .unwrap_or(Value::Null),
        _ => Value::Null,
    }
}

/// Characters `encodeURI` leaves alone besides alphanumerics
const URI: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b';').remove(b',').remove(b'/').remove(b'?').remove(b':')
    .remove(b'@').remove(b'&').remove(b'=').remove(b'+').remove(b'$')
    .remove(b'-').remove(b'_').remove(b'.').remove(b'!').remove(b'~')
    .remove(b'*').remove(b'\'').remove(b'(').remove(b')').remove(b'#');

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Encode,
    Decode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Uri,
    Base64,
}

impl Action {
    pub fn parse(name: &str) -> Result<Self, NodeError> {
        match name {
            "encode" => Ok(Action::Encode),
            "decode" => Ok(Action::Decode),
            other => Err(NodeError::Configuration(format!("Unknown convert action '{}'", other))),
        }
    }
}

impl Format {
    pub fn parse(name: &str) -> Result<Self, NodeError> {
        match name {
            "uri" => Ok(Format::Uri),
            "base64" => Ok(Format::Base64),
            other => Err(NodeError::Configuration(format!("Unknown convert format '{}'", other))),
        }
    }
}

pub fn convert(text: &str, action: Action, format: Format) -> Result<String, NodeError> {
    match (action, format) {
        (Action::Encode, Format::Uri) => Ok(utf8_percent_encode(text, URI).to_string()),
        (Action::Decode, Format::Uri) => percent_decode_str(text)
            .decode_utf8()
            .map(|decoded| decoded.into_owned())
            .map_err(|e| NodeError::ExecutionFailed(format!("URI malformed: {}", e))),
        (Action::Encode, Format::Base64) => Ok(STANDARD.encode(text.as_bytes())),
        (Action::Decode, Format::Base64) => {
            let bytes = STANDARD.decode(text.trim())
                .map_err(|e| NodeError::ExecutionFailed(format!("Invalid base64: {}", e)))?;
            String::from_utf8(bytes)
                .map_err(|e| NodeError::ExecutionFailed(format!("Decoded base64 is not text: {}", e)))
        }
    }
}

/// Encodes or decodes `text` as a URI or base64
#[derive(Default)]
pub struct ConvertNode;

#[async_trait]
impl Node for ConvertNode {
    fn schema(&self) -> NodeSchema {
        NodeSchema::new()
            .with_input("text", FieldType::String)
            .with_output("result", FieldType::String)
            .with_option_default("action", "encode")
            .with_option_default("format", "uri")
    }

    async fn process(&self, ctx: NodeContext) -> Result<NodeOutput, NodeError> {
        let action = Action::parse(ctx.option("action"))?;
        let format = Format::parse(ctx.option("format"))?;
        let text = ctx.require_str("text")?;
        Ok(NodeOutput::new().with_output("result", convert(text, action, format)?))
    }
}
