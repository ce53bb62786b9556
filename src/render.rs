//! This module provides a `Renderer` which walks a JSON value derived from a Terraform
//! configuration and emits it as HCL source text.
//!
//! The walk tracks the nesting level and the enclosing Terraform block type to decide whether a
//! key is a block-type keyword, a block label or a plain attribute. Rendering is best-effort by
//! design: it never fails, malformed fragments degrade to literal text instead. Use [`reformat`]
//! to normalize the whitespace of the resulting text.

use serde_json::{Map, Value};
use std::borrow::Cow;

/// Terraform built-in function and namespace prefixes that mark a string value as an HCL
/// expression rather than a literal. Prefix order matters: the first match wins.
static EXPRESSION_PREFIXES: &[&str] = &[
    "path", "local", "var", "module", "data", "string", "aws", "abs", "ceil", "floor", "log",
    "max", "min", "pow", "signum", "chomp", "format", "formatlist", "indent", "join", "lower",
    "replace", "split", "strrev", "substr", "title", "trimspace", "upper", "chunklist",
    "coalesce", "coalescelist", "compact", "concat", "contains", "distinct", "element",
    "flatten", "index", "keys", "length", "list", "lookup", "map", "matchkeys", "merge",
    "range", "reverse", "setintersection", "setproduct", "setunion", "slice", "sort",
    "transpose", "values", "zipmap", "base64decode", "base64encode", "base64gzip", "csvdecode",
    "jsondecode", "jsonencode", "urlencode", "yamldecode", "yamlencode", "abspath", "dirname",
    "pathexpand", "basename", "file", "fileexists", "filebase64", "templatefile", "formatdate",
    "timeadd", "timestamp", "base64sha256", "base64sha512", "bcrypt", "filebase64sha256",
    "filebase64sha512", "filemd5", "filesha1", "filesha256", "filesha512", "md5", "rsadecrypt",
    "sha1", "sha256", "sha512", "uuid", "uuidv5", "cidrhost", "cidrnetmask", "cidrsubnet",
    "tobool", "tolist", "tomap", "tonumber", "toset", "tostring",
];

/// Prefixes that only count as an expression when followed by a `.`, e.g. `aws.region` is a
/// reference while `awsome` is a literal.
static PREFIXES_REQUIRING_DOT: &[&str] = &["aws", "data"];

/// Terraform top-level keywords that start a new block-type scope.
static BLOCK_TYPES: &[&str] = &[
    "locals",
    "module",
    "output",
    "variable",
    "resource",
    "data",
    "terraform",
    "provider",
    "required_providers",
];

/// Block types whose keyword is not printed at level 1. `resource` and `data` print their
/// keyword at level 2 together with both labels instead.
static NO_KEYWORD: &[&str] = &["locals", "terraform", "data", "resource", "required_providers"];

/// Keywords that double as plain attribute names. They only start a block-type scope when their
/// value is an object or an array, e.g. `provider = "aws.west"` inside a resource stays an
/// attribute.
static DOUBLE_SCOPE: &[&str] = &["provider", "variable"];

/// Keys whose array values hold repeatable same-type blocks rather than a plain list.
static REPEATABLE: &[&str] = &["provider", "schema"];

/// Provisioner-like keys rendered as `key { ... }` without an `=` or an opening brace of their
/// own.
static NO_BRACES: &[&str] = &[
    "provisioner",
    "local-exec",
    "remote-exec",
    "chef",
    "file",
    "habitat",
    "puppet",
    "scope",
];

/// Keys rendered as nested blocks, `key { ... }` instead of `key = { ... }`.
static NO_EQUAL: &[&str] = &["assume_role", "scope"];

/// Returns `true` if the string is recognized as a Terraform expression that must be emitted
/// unquoted, based on the built-in function prefix list.
///
/// This is a heuristic, not a parser. A literal string that happens to start with a reserved
/// word will be misclassified as an expression.
pub fn is_expression(value: &str) -> bool {
    if value == "terraform.workspace" {
        return true;
    }
    if value == "local" {
        return false;
    }
    for prefix in EXPRESSION_PREFIXES {
        if let Some(rest) = value.strip_prefix(prefix) {
            if PREFIXES_REQUIRING_DOT.contains(prefix) && !rest.starts_with('.') {
                return false;
            }
            if *prefix == "index" && !value.contains('(') {
                return false;
            }
            return true;
        }
    }
    false
}

/// Returns `true` for strings that look like a bare `for` expression or a resource address,
/// which must also be emitted unquoted.
fn is_template_fragment(value: &str) -> bool {
    let compact = value.replace(' ', "");
    compact.starts_with("{for") || compact.starts_with("[for") || compact.starts_with("aws_")
}

/// Splits the trailing `!` block marker off a key. The marker signals "render as a nested block
/// rather than an assigned map" and never appears in emitted text.
fn split_block_marker(key: &str) -> (&str, bool) {
    match key.strip_suffix('!') {
        Some(stripped) if !stripped.is_empty() => (stripped, true),
        _ => (key, false),
    }
}

/// Keys containing a `.` must be quoted to keep them a single identifier.
fn quote_dotted(key: &str) -> Cow<'_, str> {
    if key.contains('.') {
        Cow::Owned(format!("\"{key}\""))
    } else {
        Cow::Borrowed(key)
    }
}

/// Returns `true` if the value is a non-empty object, i.e. the surrounding key opens a brace
/// delimited body for it. Empty objects render as a literal `{}` instead.
fn braced(value: &Value) -> bool {
    value.as_object().map(|map| !map.is_empty()).unwrap_or(false)
}

/// The formatting rule family for the enclosing block type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockKind {
    /// `locals`: flat `key = value` pairs, no labels.
    Locals,
    /// `terraform`: no labels, one extra nesting level for the nested `backend` block.
    Terraform,
    /// `module`, `output`, `variable`, `provider`: keyword plus a single quoted label.
    Labeled,
    /// `resource`, `data`: keyword plus type and name labels.
    Resource,
    /// Plain attributes and everything else.
    Attribute,
}

impl BlockKind {
    fn of(block_type: &str) -> BlockKind {
        match block_type {
            "locals" => BlockKind::Locals,
            "terraform" => BlockKind::Terraform,
            "module" | "output" | "variable" | "provider" => BlockKind::Labeled,
            "resource" | "data" => BlockKind::Resource,
            _ => BlockKind::Attribute,
        }
    }
}

/// Traversal context threaded through the recursive walk. Copied on recursion so that the
/// renderer stays reentrant across independent documents.
#[derive(Debug, Clone, Default)]
struct Context {
    level: usize,
    block_type: String,
    last_key: String,
    repeated: Option<String>,
}

/// Options for the `Renderer`.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Quote numbers and booleans for HCL1 compatible output. Also disables bare expression
    /// emission entirely.
    pub quote_scalars: bool,
    /// Recognize Terraform built-in function calls and references in string values and emit
    /// them unquoted. Only meaningful for `.tf` documents.
    pub detect_expressions: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            quote_scalars: false,
            detect_expressions: true,
        }
    }
}

impl RenderOptions {
    /// Creates new `RenderOptions`.
    pub fn new() -> Self {
        Self::default()
    }
}

/// A `RendererBuilder` can be used to build a `Renderer` with certain `RenderOptions`.
///
/// ## Example
///
/// ```
/// use tfconv::render::RendererBuilder;
///
/// let renderer = RendererBuilder::new().quote_scalars(true).build();
/// ```
#[derive(Debug, Default, Clone)]
pub struct RendererBuilder {
    opts: RenderOptions,
}

impl RendererBuilder {
    /// Creates a new `RendererBuilder`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Quote numbers and booleans for HCL1 compatible output.
    pub fn quote_scalars(&mut self, yes: bool) -> &mut Self {
        self.opts.quote_scalars = yes;
        self
    }

    /// Recognize Terraform expressions in string values and emit them unquoted.
    pub fn detect_expressions(&mut self, yes: bool) -> &mut Self {
        self.opts.detect_expressions = yes;
        self
    }

    /// Builds the `Renderer`.
    pub fn build(&self) -> Renderer {
        Renderer::with_options(self.opts.clone())
    }
}

/// A `Renderer` emits a JSON value as HCL source text.
///
/// Rendering never fails. Input shapes the renderer does not understand degrade to literal or
/// empty text rather than raising an error.
#[derive(Debug, Default, Clone)]
pub struct Renderer {
    opts: RenderOptions,
}

impl Renderer {
    /// Creates a new `Renderer` with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new `Renderer` with options.
    pub fn with_options(opts: RenderOptions) -> Self {
        Self { opts }
    }

    /// Renders the value as an HCL text fragment.
    ///
    /// ## Example
    ///
    /// ```
    /// use serde_json::json;
    /// use tfconv::render::Renderer;
    ///
    /// let value = json!({"locals": {"count": 1}});
    ///
    /// assert_eq!(Renderer::new().render(&value), "locals {\ncount = 1\n}\n");
    /// ```
    pub fn render(&self, value: &Value) -> String {
        self.walk(value, &Context::default())
    }

    fn walk(&self, value: &Value, ctx: &Context) -> String {
        match value {
            Value::Object(map) if map.is_empty() => " {}\n".into(),
            Value::Object(map) => self.walk_object(map, ctx),
            Value::Array(items) if items.is_empty() => " []\n".into(),
            Value::Array(items) => self.walk_array(items, ctx),
            scalar => self.walk_scalar(scalar),
        }
    }

    fn walk_object(&self, map: &Map<String, Value>, ctx: &Context) -> String {
        let mut out = String::new();

        for (key, value) in map {
            let mut level = ctx.level;
            let mut block_type = ctx.block_type.clone();
            let mut repeated = ctx.repeated.clone();

            // A `backend` key directly below `required_providers` belongs to the enclosing
            // `terraform` block one level down.
            if key == "backend" && level == 0 && block_type == "required_providers" {
                block_type = ctx.last_key.clone();
                level = 1;
            }

            if BLOCK_TYPES.contains(&key.as_str())
                && (!DOUBLE_SCOPE.contains(&key.as_str()) || value.is_object() || value.is_array())
            {
                repeated = None;
                if !REPEATABLE.contains(&block_type.as_str()) {
                    level = 0;
                }
                block_type = key.clone();
            }

            if value.is_array() && REPEATABLE.contains(&key.as_str()) {
                repeated = Some(key.clone());
            }

            if level == 1 && !block_type.is_empty() && !NO_KEYWORD.contains(&block_type.as_str()) {
                out.push_str(&block_type);
                out.push(' ');
            }

            let kind = BlockKind::of(&block_type);
            out.push_str(&open_key(
                kind,
                key,
                level,
                value,
                &block_type,
                &ctx.last_key,
                repeated.is_some(),
            ));

            let child = Context {
                level: level + 1,
                block_type: block_type.clone(),
                last_key: key.clone(),
                repeated: repeated.clone(),
            };
            out.push_str(&self.walk(value, &child));

            out.push_str(close_key(kind, level, value));
        }

        out
    }

    fn walk_array(&self, items: &[Value], ctx: &Context) -> String {
        let mut out = String::new();
        let last = items.len() - 1;

        for (idx, item) in items.iter().enumerate() {
            if ctx.repeated.is_some() && ctx.level < 2 {
                // Repeatable same-type blocks: re-enter each element at level 1 so it gets full
                // top-level treatment, e.g. one `provider "aws" { ... }` block per element.
                let child = Context {
                    level: 1,
                    block_type: ctx.block_type.clone(),
                    last_key: String::new(),
                    repeated: ctx.repeated.clone(),
                };
                out.push_str(&self.walk(item, &child));
            } else if let Value::Object(object) = item {
                let (stripped, is_block) = split_block_marker(&ctx.last_key);
                if idx == 0 {
                    if ctx.last_key != "provisioner" {
                        out.push_str(" {\n");
                    }
                } else if ctx.last_key == "provisioner" {
                    out.push_str(&ctx.last_key);
                    out.push(' ');
                } else if NO_EQUAL.contains(&ctx.last_key.as_str()) || is_block {
                    out.push_str(stripped);
                    out.push_str(" {\n");
                } else {
                    out.push_str(&ctx.last_key);
                    out.push_str(" = {\n");
                }
                if !object.is_empty() {
                    let child = Context {
                        level: ctx.level,
                        block_type: ctx.block_type.clone(),
                        last_key: ctx.last_key.clone(),
                        repeated: ctx.repeated.clone(),
                    };
                    out.push_str(&self.walk(item, &child));
                }
                if ctx.last_key != "provisioner" {
                    out.push_str("}\n");
                }
            } else {
                if idx == 0 {
                    out.push_str(" [\n");
                }
                let child = Context {
                    level: ctx.level + 1,
                    block_type: ctx.block_type.clone(),
                    last_key: String::new(),
                    repeated: ctx.repeated.clone(),
                };
                out.push_str(&self.walk(item, &child));
                if idx < last {
                    if out.ends_with('\n') {
                        out.truncate(out.len() - 1);
                    }
                    out.push_str(",\n");
                } else {
                    out.push_str("]\n");
                }
            }
        }

        out
    }

    fn walk_scalar(&self, value: &Value) -> String {
        match value {
            Value::Null => String::new(),
            Value::Bool(b) => {
                if self.opts.quote_scalars {
                    format!("\"{b}\"\n")
                } else {
                    format!("{b}\n")
                }
            }
            Value::Number(n) => {
                if self.opts.quote_scalars {
                    format!("\"{n}\"\n")
                } else {
                    format!("{n}\n")
                }
            }
            Value::String(s) => {
                let (stripped, is_block) = split_block_marker(s);
                let expression = self.opts.detect_expressions && is_expression(stripped);
                if (expression || is_template_fragment(stripped) || is_block)
                    && !self.opts.quote_scalars
                {
                    format!("{stripped}\n")
                } else {
                    format!("\"{stripped}\"\n")
                }
            }
            Value::Object(_) | Value::Array(_) => String::new(),
        }
    }
}

fn open_key(
    kind: BlockKind,
    key: &str,
    level: usize,
    value: &Value,
    block_type: &str,
    last_key: &str,
    repeated: bool,
) -> String {
    match kind {
        BlockKind::Locals => {
            let mut out = if level == 0 {
                key.to_string()
            } else {
                format!("{key} = ")
            };
            if braced(value) {
                out.push_str(" {\n");
            }
            out
        }
        BlockKind::Terraform => {
            let mut out = match level {
                0 => key.to_string(),
                1 => format!("{key} "),
                2 => format!("\"{key}\""),
                _ => format!("{} = ", quote_dotted(key)),
            };
            if braced(value) && level != 1 {
                out.push_str(" {\n");
            }
            out
        }
        BlockKind::Labeled => {
            let (key, is_block) = split_block_marker(key);
            let mut out = match level {
                0 => String::new(),
                1 => format!("\"{key}\""),
                _ if NO_EQUAL.contains(&key) || is_block => key.to_string(),
                _ => format!("{} =", quote_dotted(key)),
            };
            if braced(value) && level >= 1 {
                out.push_str(" {\n");
            }
            out
        }
        BlockKind::Resource => {
            let (key, is_block) = split_block_marker(key);
            let mut out = match level {
                0 | 1 => String::new(),
                2 => format!("{block_type} \"{last_key}\" \"{key}\""),
                _ => {
                    if key.contains(['/', ',', '.']) || last_key == "provisioner" {
                        if NO_BRACES.contains(&key) || is_block {
                            format!("\"{key}\" ")
                        } else {
                            format!("\"{key}\" =")
                        }
                    } else if NO_BRACES.contains(&key) || NO_EQUAL.contains(&key) || is_block {
                        format!("{key} ")
                    } else {
                        format!("{} =", quote_dotted(key))
                    }
                }
            };
            if braced(value) && level >= 2 {
                out.push_str(" {\n");
            }
            out
        }
        BlockKind::Attribute => {
            let mut out = if repeated && level == 1 {
                format!(" \"{key}\" ")
            } else if key == "required_providers" {
                format!("{key} ")
            } else if !value.is_array() || level > 0 || block_type.is_empty() {
                format!("{} =", quote_dotted(key))
            } else {
                String::new()
            };
            if braced(value) {
                out.push_str(" {\n");
            }
            out
        }
    }
}

fn close_key(kind: BlockKind, level: usize, value: &Value) -> &'static str {
    let close = if braced(value) { "}\n" } else { "" };

    match kind {
        BlockKind::Locals | BlockKind::Attribute => close,
        BlockKind::Terraform => {
            if level == 1 {
                ""
            } else {
                close
            }
        }
        BlockKind::Labeled => {
            if level == 0 {
                ""
            } else {
                close
            }
        }
        BlockKind::Resource => {
            if level <= 1 {
                ""
            } else {
                close
            }
        }
    }
}

/// Re-parses rendered HCL text and pretty-prints it, normalizing whitespace. Best-effort: input
/// that does not parse is returned unchanged.
pub fn reformat(input: &str) -> String {
    hcl::parse(input)
        .ok()
        .and_then(|body| hcl::format::to_string(&body).ok())
        .unwrap_or_else(|| input.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn render(value: &Value) -> String {
        Renderer::new().render(value)
    }

    #[test]
    fn test_simple_resource() {
        let value = json!({
            "resource": {
                "aws_instance": {
                    "foo": {
                        "ami": "ami-123",
                        "count": 2
                    }
                }
            }
        });

        assert_eq!(
            render(&value),
            "resource \"aws_instance\" \"foo\" {\nami =\"ami-123\"\ncount =2\n}\n"
        );
    }

    #[test]
    fn test_provider_single_label() {
        let value = json!({"provider": {"aws": {"region": "us-east-1"}}});

        assert_eq!(
            render(&value),
            "provider \"aws\" {\nregion =\"us-east-1\"\n}\n"
        );
    }

    #[test]
    fn test_variable_single_label() {
        let value = json!({"variable": {"region": {"default": "us-east-1"}}});

        assert_eq!(
            render(&value),
            "variable \"region\" {\ndefault =\"us-east-1\"\n}\n"
        );
    }

    #[test]
    fn test_locals() {
        let value = json!({"locals": {"count": 1}});

        assert_eq!(render(&value), "locals {\ncount = 1\n}\n");
    }

    #[test]
    fn test_terraform_backend() {
        let value = json!({"terraform": {"backend": {"s3": {"bucket": "state"}}}});

        assert_eq!(
            render(&value),
            "terraform {\nbackend \"s3\" {\nbucket = \"state\"\n}\n}\n"
        );
    }

    #[test]
    fn test_repeated_provider_blocks() {
        let value = json!({
            "provider": [
                {"aws": {"region": "us-east-1"}},
                {"aws": {"region": "us-west-2"}}
            ]
        });

        assert_eq!(
            render(&value),
            "provider \"aws\" {\nregion =\"us-east-1\"\n}\nprovider \"aws\" {\nregion =\"us-west-2\"\n}\n"
        );
    }

    #[test]
    fn test_list_attribute() {
        let value = json!({"resource": {"t": {"n": {"ports": [80, 443]}}}});

        assert_eq!(
            render(&value),
            "resource \"t\" \"n\" {\nports = [\n80,\n443\n]\n}\n"
        );
    }

    #[test]
    fn test_empty_collections() {
        assert_eq!(render(&json!({})), " {}\n");
        assert_eq!(render(&json!([])), " []\n");
        assert_eq!(render(&json!({"a": {}})), "a = {}\n");
        assert_eq!(render(&json!({"a": []})), "a = []\n");
    }

    #[test]
    fn test_null_is_omitted() {
        assert_eq!(render(&json!(null)), "");
        assert!(!render(&json!({"resource": {"t": {"n": {"a": null}}}})).contains("null"));
    }

    #[test]
    fn test_block_marker_is_stripped() {
        let value = json!({
            "resource": {
                "aws_instance": {
                    "web": {
                        "lifecycle!": {"create_before_destroy": true}
                    }
                }
            }
        });
        let out = render(&value);

        assert!(out.contains("lifecycle  {\n"));
        assert!(!out.contains('!'));
        assert!(!out.contains("lifecycle ="));
    }

    #[test]
    fn test_expression_values_unquoted() {
        let value = json!({"resource": {"t": {"n": {"ami": "var.ami_id"}}}});

        assert_eq!(render(&value), "resource \"t\" \"n\" {\nami =var.ami_id\n}\n");
    }

    #[test]
    fn test_dotted_keys_quoted() {
        let out = render(&json!({"resource": {"t": {"n": {"a.b": "v"}}}}));

        assert!(out.contains("\"a.b\" ="));
    }

    #[test]
    fn test_quote_scalars() {
        let renderer = RendererBuilder::new().quote_scalars(true).build();
        let out = renderer.render(&json!({"resource": {"t": {"n": {
            "count": 2,
            "enabled": true,
            "ami": "var.ami_id"
        }}}}));

        assert!(out.contains("count =\"2\"\n"));
        assert!(out.contains("enabled =\"true\"\n"));
        assert!(out.contains("ami =\"var.ami_id\"\n"));
    }

    #[test]
    fn test_expression_detection_disabled() {
        let renderer = RendererBuilder::new().detect_expressions(false).build();
        let out = renderer.render(&json!({"a": "var.foo"}));

        assert_eq!(out, "a =\"var.foo\"\n");
    }

    #[test]
    fn test_is_expression() {
        assert!(is_expression("terraform.workspace"));
        assert!(is_expression("var.foo"));
        assert!(is_expression("module.vpc.id"));
        assert!(is_expression("lookup(var.map, \"key\")"));
        assert!(is_expression("jsonencode({})"));
        assert!(is_expression("index(var.list, \"item\")"));
        assert!(is_expression("aws.west"));
        assert!(is_expression("data.aws_ami.ubuntu.id"));

        assert!(!is_expression("hello"));
        assert!(!is_expression("2021-01-01"));
        assert!(!is_expression("local"));
        assert!(!is_expression("index"));
        assert!(!is_expression("aws"));
        assert!(!is_expression("database"));
    }

    #[test]
    fn test_template_fragments_unquoted() {
        let out = render(&json!({"a": "{ for k, v in var.m : k => v }"}));

        assert_eq!(out, "a ={ for k, v in var.m : k => v }\n");
    }

    #[test]
    fn test_reformat() {
        let formatted = reformat("locals {\ncount = 1\n}\n");

        assert_eq!(formatted, "locals {\n  count = 1\n}\n");
    }

    #[test]
    fn test_reformat_keeps_unparseable_input() {
        assert_eq!(reformat("not { hcl"), "not { hcl");
    }
}
