use async_trait::async_trait;
use helpercore::{FieldType, Node, NodeContext, NodeError, NodeOutput, NodeSchema, Value};
use std::cmp::Ordering;

#[derive(Default)]
pub struct BooleanTrueNode;

#[async_trait]
impl Node for BooleanTrueNode {
    fn schema(&self) -> NodeSchema {
        NodeSchema::new().with_output("value", FieldType::Boolean)
    }

    async fn process(&self, _ctx: NodeContext) -> Result<NodeOutput, NodeError> {
        Ok(NodeOutput::new().with_output("value", true))
    }
}

#[derive(Default)]
pub struct BooleanFalseNode;

#[async_trait]
impl Node for BooleanFalseNode {
    fn schema(&self) -> NodeSchema {
        NodeSchema::new().with_output("value", FieldType::Boolean)
    }

    async fn process(&self, _ctx: NodeContext) -> Result<NodeOutput, NodeError> {
        Ok(NodeOutput::new().with_output("value", false))
    }
}

/// Truthiness of any value
#[derive(Default)]
pub struct BooleanFromNode;

#[async_trait]
impl Node for BooleanFromNode {
    fn schema(&self) -> NodeSchema {
        NodeSchema::new()
            .with_input("value", FieldType::Any)
            .with_output("result", FieldType::Boolean)
    }

    async fn process(&self, ctx: NodeContext) -> Result<NodeOutput, NodeError> {
        let value = ctx.require_input("value")?;
        Ok(NodeOutput::new().with_output("result", value.is_truthy()))
    }
}

/// Emits its `value` option read as a number
#[derive(Default)]
pub struct NumberDeclareNode;

#[async_trait]
impl Node for NumberDeclareNode {
    fn schema(&self) -> NodeSchema {
        NodeSchema::new()
            .with_output("value", FieldType::Number)
            .with_option("value")
    }

    async fn process(&self, ctx: NodeContext) -> Result<NodeOutput, NodeError> {
        Ok(NodeOutput::new().with_output("value", parse_float(ctx.option("value"))))
    }
}

/// Longest leading decimal number in `text`, NaN when there is none
pub fn parse_float(text: &str) -> f64 {
    let text = text.trim_start();
    for keyword in ["Infinity", "+Infinity", "-Infinity"] {
        if text.starts_with(keyword) {
            return if keyword.starts_with('-') { f64::NEG_INFINITY } else { f64::INFINITY };
        }
    }

    let bytes = text.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end < bytes.len() && bytes[end] == b'.' {
        end += 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
    }
    if !text[digits_start..end].bytes().any(|b| b.is_ascii_digit()) {
        return f64::NAN;
    }

    let mantissa_end = end;
    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_digits = exp;
        while exp < bytes.len() && bytes[exp].is_ascii_digit() {
            exp += 1;
        }
        end = if exp > exp_digits { exp } else { mantissa_end };
    }

    text[..end].parse().unwrap_or(f64::NAN)
}

/// Comparison operators understood by the branch node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Equal,
    NotEqual,
    StrictEqual,
    StrictNotEqual,
    Greater,
    GreaterOrEqual,
    Less,
    LessOrEqual,
}

impl Operator {
    pub fn parse(symbol: &str) -> Result<Self, NodeError> {
        match symbol {
            "==" => Ok(Operator::Equal),
            "!=" => Ok(Operator::NotEqual),
            "===" => Ok(Operator::StrictEqual),
            "!==" => Ok(Operator::StrictNotEqual),
            ">" => Ok(Operator::Greater),
            ">=" => Ok(Operator::GreaterOrEqual),
            "<" => Ok(Operator::Less),
            "<=" => Ok(Operator::LessOrEqual),
            other => Err(NodeError::Configuration(format!("Unknown operator '{}'", other))),
        }
    }

    pub fn apply(self, left: &Value, right: &Value) -> bool {
        let ordering = left.compare(right);
        match self {
            Operator::Equal => left.loose_eq(right),
            Operator::NotEqual => !left.loose_eq(right),
            Operator::StrictEqual => left.strict_eq(right),
            Operator::StrictNotEqual => !left.strict_eq(right),
            Operator::Greater => ordering == Some(Ordering::Greater),
            Operator::GreaterOrEqual => matches!(ordering, Some(Ordering::Greater | Ordering::Equal)),
            Operator::Less => ordering == Some(Ordering::Less),
            Operator::LessOrEqual => matches!(ordering, Some(Ordering::Less | Ordering::Equal)),
        }
    }
}

/// Routes `value` to `pass` or `fail` depending on how `left` compares to
/// `right`; the other output is cleared downstream
#[derive(Default)]
pub struct BranchNode;

#[async_trait]
impl Node for BranchNode {
    fn schema(&self) -> NodeSchema {
        NodeSchema::new()
            .with_input("value", FieldType::Any)
            .with_input("left", FieldType::Any)
            .with_input("right", FieldType::Any)
            .with_output("pass", FieldType::Any)
            .with_output("fail", FieldType::Any)
            .with_option_default("operator", "==")
    }

    async fn process(&self, ctx: NodeContext) -> Result<NodeOutput, NodeError> {
        let operator = Operator::parse(ctx.option("operator"))?;
        let value = ctx.require_input("value")?.clone();
        let left = ctx.require_input("left")?;
        let right = ctx.require_input("right")?;

        let field = if operator.apply(left, right) { "pass" } else { "fail" };
        Ok(NodeOutput::new().with_output(field, value))
    }
}

/// First present of `left` and `right`
#[derive(Default)]
pub struct BranchCoalesceNode;

#[async_trait]
impl Node for BranchCoalesceNode {
    fn schema(&self) -> NodeSchema {
        NodeSchema::new()
            .with_optional_input("left", FieldType::Any)
            .with_optional_input("right", FieldType::Any)
            .with_output("value", FieldType::Any)
    }

    async fn process(&self, ctx: NodeContext) -> Result<NodeOutput, NodeError> {
        let value = ctx.input("left").or_else(|| ctx.input("right")).cloned();
        Ok(NodeOutput::new().with_output("value", value))
    }
}
