//! Handlebars helpers binding directives and operations to the executor.

use std::sync::Arc;

use handlebars::{
    BlockContext, Context, Handlebars, Helper, HelperDef, HelperResult, Output, RenderContext,
    RenderError, RenderErrorReason, Renderable, ScopedJson,
};
use stencil_value::{DiagnosticPolicy, OperationRegistry, Value};

/// Name the `template` directive is served under.
pub const TEMPLATE_HELPER: &str = "template";

/// Renders another template of the same bundle in place.
///
/// `{{template "nav.tmpl"}}` renders with the current context,
/// `{{template "nav.tmpl" user}}` renders with `user` as `this`.
pub struct TemplateHelper;

impl HelperDef for TemplateHelper {
    fn call<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        r: &'reg Handlebars<'reg>,
        ctx: &'rc Context,
        rc: &mut RenderContext<'reg, 'rc>,
        out: &mut dyn Output,
    ) -> HelperResult {
        let name = h
            .param(0)
            .ok_or(RenderErrorReason::ParamNotFoundForIndex(TEMPLATE_HELPER, 0))?;
        let name = name
            .value()
            .as_str()
            .ok_or(RenderErrorReason::InvalidParamType("template name must be a string"))?;
        let template = r
            .get_template(name)
            .ok_or_else(|| RenderErrorReason::TemplateNotFound(name.to_string()))?;

        match h.param(1) {
            Some(data) => {
                let mut block = BlockContext::new();
                block.set_base_value(data.value().clone());
                rc.push_block(block);
                let result = template.render(r, ctx, rc, out);
                rc.pop_block();
                result
            }
            None => template.render(r, ctx, rc, out),
        }
    }
}

/// Exposes one named operation as a value helper.
///
/// Parameters become operation arguments in order, so `{{add 5 items}}`
/// calls `add` with operand `5` and target `items`.
///
/// Arguments are rebuilt from the JSON the executor holds, so integers reach
/// the operation as 64-bit values and records as mappings of their public
/// fields.
pub struct OperationHelper {
    name: String,
    registry: Arc<OperationRegistry>,
    policy: DiagnosticPolicy,
}

impl OperationHelper {
    pub fn new(
        name: impl Into<String>,
        registry: Arc<OperationRegistry>,
        policy: DiagnosticPolicy,
    ) -> Self {
        Self {
            name: name.into(),
            registry,
            policy,
        }
    }
}

impl HelperDef for OperationHelper {
    fn call_inner<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        _: &'reg Handlebars<'reg>,
        _: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
    ) -> Result<ScopedJson<'rc>, RenderError> {
        let args: Vec<Value> = h.params().iter().map(|p| Value::from(p.value())).collect();
        let invocation = self
            .registry
            .invoke(&self.name, &args, self.policy)
            .map_err(|e| RenderErrorReason::Other(e.to_string()))?;
        Ok(ScopedJson::Derived(invocation.value.to_json()))
    }
}

/// Register the `template` helper and every operation of `registry`.
pub fn register_all(
    handlebars: &mut Handlebars<'static>,
    registry: &Arc<OperationRegistry>,
    policy: DiagnosticPolicy,
) {
    handlebars.register_helper(TEMPLATE_HELPER, Box::new(TemplateHelper));
    for name in registry.names() {
        handlebars.register_helper(
            name,
            Box::new(OperationHelper::new(name, Arc::clone(registry), policy)),
        );
    }
}
