use async_trait::async_trait;
use helpercore::{FieldType, Node, NodeContext, NodeError, NodeOutput, NodeSchema, Value};
use fancy_regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Emits its `value` option as a string
#[derive(Default)]
pub struct StringCreateNode;

#[async_trait]
impl Node for StringCreateNode {
    fn schema(&self) -> NodeSchema {
        NodeSchema::new()
            .with_output("value", FieldType::String)
            .with_option("value")
    }

    async fn process(&self, ctx: NodeContext) -> Result<NodeOutput, NodeError> {
        Ok(NodeOutput::new().with_output("value", ctx.option("value")))
    }
}

/// Textual form of any value
#[derive(Default)]
pub struct StringFromNode;

#[async_trait]
impl Node for StringFromNode {
    fn schema(&self) -> NodeSchema {
        NodeSchema::new()
            .with_input("value", FieldType::Any)
            .with_output("result", FieldType::String)
    }

    async fn process(&self, ctx: NodeContext) -> Result<NodeOutput, NodeError> {
        let value = ctx.require_input("value")?;
        Ok(NodeOutput::new().with_output("result", value.to_text()))
    }
}

/// Splices the `text` input into the `source` option
#[derive(Default)]
pub struct StringInsertNode;

#[async_trait]
impl Node for StringInsertNode {
    fn schema(&self) -> NodeSchema {
        NodeSchema::new()
            .with_input("text", FieldType::String)
            .with_output("result", FieldType::String)
            .with_option("source")
            .with_option_default("position", "0")
    }

    async fn process(&self, ctx: NodeContext) -> Result<NodeOutput, NodeError> {
        let text = ctx.require_str("text")?;
        // Numeric coercion: blank is 0, fractions truncate, the cast saturates
        // and sends NaN to 0
        let position = Value::from(ctx.option("position")).to_number() as i64;

        Ok(NodeOutput::new().with_output("result", insert(ctx.option("source"), text, position)))
    }
}

/// Insert at a character offset; negative offsets count from the end
fn insert(source: &str, text: &str, position: i64) -> String {
    let count = source.chars().count() as i64;
    let at = if position < 0 {
        (count + position).max(0)
    } else {
        position.min(count)
    };
    let at = at as usize;

    let split = source.char_indices()
        .nth(at)
        .map(|(i, _)| i)
        .unwrap_or(source.len());
    format!("{}{}{}", &source[..split], text, &source[split..])
}

/// Concatenates two strings with a separator between them
#[derive(Default)]
pub struct StringJoinNode;

#[async_trait]
impl Node for StringJoinNode {
    fn schema(&self) -> NodeSchema {
        NodeSchema::new()
            .with_input("left", FieldType::String)
            .with_input("right", FieldType::String)
            .with_output("result", FieldType::String)
            .with_option_default("separator", "")
    }

    async fn process(&self, ctx: NodeContext) -> Result<NodeOutput, NodeError> {
        let left = ctx.require_str("left")?;
        let right = ctx.require_str("right")?;
        let joined = format!("{}{}{}", left, ctx.option("separator"), right);
        Ok(NodeOutput::new().with_output("result", joined))
    }
}

/// Lower-cases and strips diacritics, for comparing titles
#[derive(Default)]
pub struct StringSimplifyNode;

#[async_trait]
impl Node for StringSimplifyNode {
    fn schema(&self) -> NodeSchema {
        NodeSchema::new()
            .with_input("value", FieldType::String)
            .with_output("result", FieldType::String)
    }

    async fn process(&self, ctx: NodeContext) -> Result<NodeOutput, NodeError> {
        let value = ctx.require_str("value")?;
        Ok(NodeOutput::new().with_output("result", simplify(value)))
    }
}

pub fn simplify(value: &str) -> String {
    value.nfd()
        .filter(|c| !('\u{0300}'..='\u{036f}').contains(c))
        .collect::<String>()
        .to_lowercase()
}

/// Compile a pattern; lookaround and backreferences are supported
pub(crate) fn compile(pattern: &str) -> Result<Regex, NodeError> {
    Regex::new(pattern)
        .map_err(|e| NodeError::Configuration(format!("Invalid pattern '{}': {}", pattern, e)))
}

/// Matching can fail at run time when backtracking runs away
fn run_failed(e: fancy_regex::Error) -> NodeError {
    NodeError::ExecutionFailed(format!("Pattern matching failed: {}", e))
}

/// Whether `text` matches the `pattern` option
#[derive(Default)]
pub struct StringMatchesNode;

#[async_trait]
impl Node for StringMatchesNode {
    fn schema(&self) -> NodeSchema {
        NodeSchema::new()
            .with_input("text", FieldType::String)
            .with_output("result", FieldType::Boolean)
            .with_option("pattern")
    }

    async fn process(&self, ctx: NodeContext) -> Result<NodeOutput, NodeError> {
        let text = ctx.require_str("text")?;
        let pattern = compile(ctx.option("pattern"))?;
        let matched = pattern.is_match(text).map_err(run_failed)?;
        Ok(NodeOutput::new().with_output("result", matched))
    }
}

/// First substring of `text` matching the `pattern` option; nothing when
/// there is no match
#[derive(Default)]
pub struct MatchNode;

#[async_trait]
impl Node for MatchNode {
    fn schema(&self) -> NodeSchema {
        NodeSchema::new()
            .with_input("text", FieldType::String)
            .with_output("text", FieldType::String)
            .with_option("pattern")
    }

    async fn process(&self, ctx: NodeContext) -> Result<NodeOutput, NodeError> {
        let text = ctx.require_str("text")?;
        let pattern = compile(ctx.option("pattern"))?;
        let found = pattern.find(text)
            .map_err(run_failed)?
            .map(|m| Value::from(m.as_str()));
        Ok(NodeOutput::new().with_output("text", found))
    }
}
