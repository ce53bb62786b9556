//! This module converts parsed HCL configuration into its JSON representation.
//!
//! Attributes map to JSON object entries and blocks nest one object level per label. Repeated
//! blocks with the same type and labels collect into an array. Expressions that have no JSON
//! equivalent, like traversals, function calls or arithmetic, are re-serialized to their HCL
//! source form and wrapped in `${...}` so the conversion stays lossless for Terraform.

use crate::{Error, Result};
use hcl::expr::{Expression, ObjectKey, TemplateExpr};
use hcl::template::{Directive, Element, Template};
use hcl::{Block, BlockLabel, Body};
use serde_json::{Map, Value};

/// Parses an HCL document and converts it to a JSON value.
///
/// The result is always a JSON object at the top level.
///
/// ## Example
///
/// ```
/// use serde_json::json;
///
/// let value = tfconv::convert::from_str("variable \"region\" {\n  default = \"us-east-1\"\n}\n")?;
///
/// assert_eq!(value, json!({"variable": {"region": {"default": "us-east-1"}}}));
/// # Ok::<(), tfconv::Error>(())
/// ```
///
/// ## Errors
///
/// Returns an error if the input is not parseable as HCL or if a block's labels collide with a
/// non-object value at the same path.
pub fn from_str(input: &str) -> Result<Value> {
    let body = hcl::parse(input)?;
    convert_body(&body).map(Value::Object)
}

/// Converts an HCL `Body` into a JSON object, attributes first, then blocks.
pub fn convert_body(body: &Body) -> Result<Map<String, Value>> {
    let mut out = Map::new();

    for attr in body.attributes() {
        out.insert(attr.key().to_string(), convert_expression(attr.expr())?);
    }

    for block in body.blocks() {
        merge_block(&mut out, block)?;
    }

    Ok(out)
}

/// Merges a block into the object, descending one level per label and promoting repeated blocks
/// to an array.
fn merge_block(out: &mut Map<String, Value>, block: &Block) -> Result<()> {
    let value = Value::Object(convert_body(&block.body)?);

    let mut cursor = out;
    let mut key = block.identifier().to_string();

    for (idx, label) in block.labels().iter().enumerate() {
        let node = cursor
            .entry(key)
            .or_insert_with(|| Value::Object(Map::new()));

        cursor = match node.as_object_mut() {
            Some(object) => object,
            None => {
                let labels = block.labels()[..idx].iter().map(BlockLabel::as_str);
                return Err(Error::block_conflict(
                    std::iter::once(block.identifier()).chain(labels),
                ));
            }
        };

        key = label.as_str().to_string();
    }

    match cursor.remove(&key) {
        Some(Value::Array(mut items)) => {
            items.push(value);
            cursor.insert(key, Value::Array(items));
        }
        Some(existing) => {
            cursor.insert(key, Value::Array(vec![existing, value]));
        }
        None => {
            cursor.insert(key, value);
        }
    }

    Ok(())
}

/// Converts a single HCL expression into a JSON value.
pub fn convert_expression(expr: &Expression) -> Result<Value> {
    match expr {
        Expression::Null => Ok(Value::Null),
        Expression::Bool(b) => Ok(Value::Bool(*b)),
        Expression::Number(num) => Ok(convert_number(num)),
        Expression::String(s) => Ok(Value::String(s.clone())),
        Expression::TemplateExpr(template) => convert_template(template).map(Value::String),
        Expression::Array(items) => items
            .iter()
            .map(convert_expression)
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        Expression::Object(object) => {
            let mut map = Map::with_capacity(object.len());
            for (key, value) in object {
                map.insert(convert_key(key)?, convert_expression(value)?);
            }
            Ok(Value::Object(map))
        }
        other => wrap_expression(other).map(Value::String),
    }
}

fn convert_key(key: &ObjectKey) -> Result<String> {
    match key {
        ObjectKey::Identifier(ident) => Ok(ident.to_string()),
        ObjectKey::Expression(expr) => match expr {
            Expression::String(s) => Ok(s.clone()),
            Expression::TemplateExpr(template) => convert_template(template),
            other => Ok(hcl::format::to_string(other)?),
        },
        other => Ok(hcl::format::to_string(other)?),
    }
}

fn convert_number(num: &hcl::Number) -> Value {
    if let Some(n) = num.as_i64() {
        Value::from(n)
    } else if let Some(n) = num.as_u64() {
        Value::from(n)
    } else {
        num.as_f64().map(Value::from).unwrap_or(Value::Null)
    }
}

/// Serializes an expression back to HCL source text and wraps it as an interpolation.
fn wrap_expression(expr: &Expression) -> Result<String> {
    Ok(format!("${{{}}}", hcl::format::to_string(expr)?))
}

/// Converts a string template back into its source form, including `%{if}` and `%{for}`
/// directives.
fn convert_template(expr: &TemplateExpr) -> Result<String> {
    let template = Template::from_expr(expr)?;
    let mut out = String::new();
    write_template(&template, &mut out)?;
    Ok(out)
}

fn write_template(template: &Template, out: &mut String) -> Result<()> {
    for element in template.elements() {
        write_element(element, out)?;
    }

    Ok(())
}

fn write_element(element: &Element, out: &mut String) -> Result<()> {
    match element {
        Element::Literal(literal) => out.push_str(literal),
        Element::Interpolation(interp) => {
            out.push_str("${");
            out.push_str(&hcl::format::to_string(&interp.expr)?);
            out.push('}');
        }
        Element::Directive(Directive::If(directive)) => {
            out.push_str("%{if ");
            out.push_str(&hcl::format::to_string(&directive.cond_expr)?);
            out.push('}');
            write_template(&directive.true_template, out)?;
            if let Some(false_template) = &directive.false_template {
                out.push_str("%{else}");
                write_template(false_template, out)?;
            }
            out.push_str("%{endif}");
        }
        Element::Directive(Directive::For(directive)) => {
            out.push_str("%{for ");
            if let Some(key_var) = &directive.key_var {
                out.push_str(key_var.as_str());
                out.push_str(", ");
            }
            out.push_str(directive.value_var.as_str());
            out.push_str(" in ");
            out.push_str(&hcl::format::to_string(&directive.collection_expr)?);
            out.push('}');
            write_template(&directive.template, out)?;
            out.push_str("%{endfor}");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::Renderer;
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_attributes() {
        let input = indoc! {r#"
            name = "web"
            count = 2
            ratio = 0.5
            enabled = true
            nothing = null
        "#};

        assert_eq!(
            from_str(input).unwrap(),
            json!({
                "name": "web",
                "count": 2,
                "ratio": 0.5,
                "enabled": true,
                "nothing": null
            })
        );
    }

    #[test]
    fn test_blocks_nest_by_label() {
        let input = indoc! {r#"
            resource "aws_instance" "web" {
              ami = "ami-123"

              tags = {
                Name = "web"
                "a.b" = 1
              }
            }
        "#};

        assert_eq!(
            from_str(input).unwrap(),
            json!({
                "resource": {
                    "aws_instance": {
                        "web": {
                            "ami": "ami-123",
                            "tags": {"Name": "web", "a.b": 1}
                        }
                    }
                }
            })
        );
    }

    #[test]
    fn test_repeated_blocks_collect_into_array() {
        let input = indoc! {r#"
            provider "aws" {
              region = "us-east-1"
            }

            provider "aws" {
              alias  = "west"
              region = "us-west-2"
            }
        "#};

        assert_eq!(
            from_str(input).unwrap(),
            json!({
                "provider": {
                    "aws": [
                        {"region": "us-east-1"},
                        {"alias": "west", "region": "us-west-2"}
                    ]
                }
            })
        );
    }

    #[test]
    fn test_block_label_conflict() {
        let input = indoc! {r#"
            resource = "oops"

            resource "aws_instance" "web" {}
        "#};

        let err = from_str(input).unwrap_err();

        assert!(matches!(err, Error::BlockConflict(_)));
        assert_eq!(
            err.to_string(),
            "unable to convert block to JSON: `resource` collides with a non-object value"
        );
    }

    #[test]
    fn test_tuples() {
        let input = "ports = [80, 443]\n";

        assert_eq!(from_str(input).unwrap(), json!({"ports": [80, 443]}));
    }

    #[test]
    fn test_interpolations_survive() {
        let input = "greeting = \"hello, ${var.name}\"\n";

        assert_eq!(
            from_str(input).unwrap(),
            json!({"greeting": "hello, ${var.name}"})
        );
    }

    #[test]
    fn test_raw_expressions_are_wrapped() {
        let input = indoc! {r#"
            ami  = var.ami_id
            name = upper("web")
        "#};

        assert_eq!(
            from_str(input).unwrap(),
            json!({
                "ami": "${var.ami_id}",
                "name": "${upper(\"web\")}"
            })
        );
    }

    #[test]
    fn test_if_directive() {
        let input = "msg = \"%{if var.up}ok%{else}down%{endif}\"\n";

        assert_eq!(
            from_str(input).unwrap(),
            json!({"msg": "%{if var.up}ok%{else}down%{endif}"})
        );
    }

    #[test]
    fn test_for_directive() {
        let input = "msg = \"%{for k, v in var.m}${k}%{endfor}\"\n";

        assert_eq!(
            from_str(input).unwrap(),
            json!({"msg": "%{for k, v in var.m}${k}%{endfor}"})
        );
    }

    #[test]
    fn test_round_trip_with_renderer() {
        let value = json!({
            "resource": {
                "aws_instance": {
                    "web": {
                        "ami": "ami-123",
                        "count": 2,
                        "tags": {"Name": "web"}
                    }
                }
            },
            "provider": {
                "aws": {"region": "us-east-1"}
            }
        });

        let rendered = Renderer::new().render(&value);

        assert_eq!(from_str(&rendered).unwrap(), value);
    }
}
