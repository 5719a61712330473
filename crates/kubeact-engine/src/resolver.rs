//! Two-pass template resolution for manifest files
//!
//! The global pass runs over the raw file text before YAML parsing and uses
//! `<$= ... $>`, `<$% ... %$>` and `<$# ... #$>` delimiters. The local pass runs
//! over each parsed document and renders `<%= ... %>`, `<%% ... %%>` and
//! `<%# ... #%>` found in string values. `$ref:` references are resolved last.
//!
//! Neither pass reacts to `{{ }}` or `${...}`, so Go templates (Prometheus
//! rules, Argo workflows, Helm-style annotations) and shell scripts embedded
//! in manifests pass through untouched.
//!
//! Both passes see the shared context as `ctx`, `secrets` and `parameters`.

use minijinja::syntax::SyntaxConfig;
use minijinja::{Environment, UndefinedBehavior, Value};
use serde_json::Value as JsonValue;

use kubeact_core::SharedContext;

use crate::error::{EngineError, Result, TemplateError};
use crate::filters;

/// Pluggable template resolution used by the manifest resolver
pub trait TemplateResolver: Send + Sync {
    /// Resolve templates in raw file text
    fn resolve_global(&self, source: &str, name: &str, context: &SharedContext) -> Result<String>;

    /// Resolve templates inside an already parsed document
    fn resolve_local(
        &self,
        value: JsonValue,
        name: &str,
        context: &SharedContext,
    ) -> Result<JsonValue>;

    /// Replace `$ref:` strings with values from the shared context
    fn resolve_references(&self, value: JsonValue, context: &SharedContext) -> Result<JsonValue> {
        Ok(context.resolve_references(value)?)
    }
}

/// Leaves templates untouched; references are still resolved
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopResolver;

impl TemplateResolver for NoopResolver {
    fn resolve_global(&self, source: &str, _name: &str, _context: &SharedContext) -> Result<String> {
        Ok(source.to_string())
    }

    fn resolve_local(
        &self,
        value: JsonValue,
        _name: &str,
        _context: &SharedContext,
    ) -> Result<JsonValue> {
        Ok(value)
    }
}

/// Builder for [`JinjaResolver`]
pub struct JinjaResolverBuilder {
    strict_mode: bool,
}

impl Default for JinjaResolverBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl JinjaResolverBuilder {
    pub fn new() -> Self {
        Self { strict_mode: true }
    }

    /// Fail on undefined variables (default) or render them as empty
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict_mode = strict;
        self
    }

    pub fn build(self) -> Result<JinjaResolver> {
        let mut global = create_environment(self.strict_mode);
        global.set_syntax(syntax(GLOBAL_MARKER, '$')?);

        let mut local = create_environment(self.strict_mode);
        local.set_syntax(syntax(LOCAL_MARKER, '%')?);

        Ok(JinjaResolver { global, local })
    }
}

/// MiniJinja-backed resolver
pub struct JinjaResolver {
    global: Environment<'static>,
    local: Environment<'static>,
}

impl std::fmt::Debug for JinjaResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JinjaResolver").finish_non_exhaustive()
    }
}

impl JinjaResolver {
    pub fn builder() -> JinjaResolverBuilder {
        JinjaResolverBuilder::new()
    }

    fn render_local_strings(
        &self,
        value: JsonValue,
        name: &str,
        template_context: &Value,
    ) -> Result<JsonValue> {
        match value {
            JsonValue::String(s) if s.contains(LOCAL_MARKER) => {
                let rendered = self
                    .local
                    .render_named_str(name, &s, template_context)
                    .map_err(|e| TemplateError::from_minijinja(e, name, &s))?;
                Ok(JsonValue::String(rendered))
            }
            JsonValue::Array(items) => items
                .into_iter()
                .map(|item| self.render_local_strings(item, name, template_context))
                .collect::<Result<Vec<_>>>()
                .map(JsonValue::Array),
            JsonValue::Object(map) => {
                let mut rendered = serde_json::Map::with_capacity(map.len());
                for (key, item) in map {
                    rendered.insert(key, self.render_local_strings(item, name, template_context)?);
                }
                Ok(JsonValue::Object(rendered))
            }
            other => Ok(other),
        }
    }
}

impl TemplateResolver for JinjaResolver {
    fn resolve_global(&self, source: &str, name: &str, context: &SharedContext) -> Result<String> {
        if !source.contains(GLOBAL_MARKER) {
            return Ok(source.to_string());
        }

        self.global
            .render_named_str(name, source, template_context(context))
            .map_err(|e| EngineError::Template(TemplateError::from_minijinja(e, name, source)))
    }

    fn resolve_local(
        &self,
        value: JsonValue,
        name: &str,
        context: &SharedContext,
    ) -> Result<JsonValue> {
        self.render_local_strings(value, name, &template_context(context))
    }
}

fn create_environment(strict_mode: bool) -> Environment<'static> {
    let mut env = Environment::new();

    if strict_mode {
        env.set_undefined_behavior(UndefinedBehavior::Strict);
    } else {
        env.set_undefined_behavior(UndefinedBehavior::Lenient);
    }
    env.set_keep_trailing_newline(true);

    env.add_filter("toyaml", filters::toyaml);
    env.add_filter("tojson", filters::tojson);
    env.add_filter("b64encode", filters::b64encode);
    env.add_filter("b64decode", filters::b64decode);
    env.add_filter("quote", filters::quote);
    env.add_filter("nindent", filters::nindent);
    env.add_filter("required", filters::required);
    env.add_filter("sha256", filters::sha256sum);

    env
}

fn template_context(context: &SharedContext) -> Value {
    Value::from_serialize(context)
}

/// Opening of every global-pass tag
const GLOBAL_MARKER: &str = "<$";
/// Opening of every local-pass tag
const LOCAL_MARKER: &str = "<%";

/// `<m= ... c>`, `<m% ... %c>` and `<m# ... #c>` where `m` is the opening
/// marker and `c` its closing character
fn syntax(marker: &str, close: char) -> Result<SyntaxConfig> {
    SyntaxConfig::builder()
        .variable_delimiters(format!("{}=", marker), format!("{}>", close))
        .block_delimiters(format!("{}%", marker), format!("%{}>", close))
        .comment_delimiters(format!("{}#", marker), format!("#{}>", close))
        .build()
        .map_err(|e| EngineError::Template(TemplateError::from_minijinja(e, "<syntax>", "")))
}
