#![forbid(unsafe_code)]

use std::rc::Rc;

use super::{Built, CHECKED, Control, ControlKind, event_args};
use crate::binding::{Bound, ChangeCallback};
use crate::context::RuntimeContext;
use crate::diagnostics::DiagnosticKind;
use crate::host::{HostDocument, HostValue};
use crate::registry::PayloadError;

/// Checkbox bound to a `bool`.
pub struct Toggle {
    name: String,
    id: String,
    value: Bound<bool>,
    on_change: Option<ChangeCallback<bool>>,
}

impl Toggle {
    pub fn new(ctx: &RuntimeContext, name: impl Into<String>, value: Bound<bool>) -> Self {
        let name = name.into();
        let id = ctx.allocate_id(&name, ControlKind::Toggle.as_str());
        Self {
            name,
            id,
            value,
            on_change: None,
        }
    }

    /// Run `f(old, new)` before each host-originated change is stored.
    #[must_use]
    pub fn on_change(mut self, f: impl Fn(&bool, &bool) + 'static) -> Self {
        self.on_change = Some(Rc::new(f));
        self
    }
}

impl<D: HostDocument> Control<D> for Toggle {
    fn kind(&self) -> ControlKind {
        ControlKind::Toggle
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn build(&mut self, ctx: &RuntimeContext, doc: &D) -> Built<D::Node> {
        let initial = self.value.get();
        tracing::debug!(name = %self.name, id = %self.id, initial, "building toggle");

        let input = doc.create_element("input");
        doc.set_attribute(&input, "type", "checkbox");
        doc.set_attribute(&input, "id", &self.id);
        doc.set_attribute(&input, "class", "optionToggle");
        if initial {
            doc.set_attribute(&input, "defaultChecked", CHECKED);
            doc.set_attribute(&input, CHECKED, CHECKED);
        }
        doc.set_attribute(
            &input,
            "onclick",
            &format!("{}(this.id, this.checked)", ControlKind::Toggle.handler_name()),
        );

        let bound = self.value.clone();
        let on_change = self.on_change.clone();
        ctx.register(
            &self.id,
            Rc::new(move |raw: &HostValue| {
                let next = raw.as_bool().ok_or_else(|| PayloadError::new("bool", raw))?;
                if let Some(on_change) = &on_change {
                    on_change(&bound.get(), &next);
                }
                bound.replace(next);
                Ok(())
            }),
        );

        Built {
            label: self.name.clone(),
            id: self.id.clone(),
            label_for: self.id.clone(),
            kind: ControlKind::Toggle,
            nodes: vec![input],
        }
    }

    fn handle_update(&self, ctx: &RuntimeContext, _doc: &D, args: &[HostValue]) {
        let Some((id, raw)) = event_args(ctx, ControlKind::Toggle, args) else {
            return;
        };
        let Some(checked) = raw.as_bool() else {
            ctx.diagnose(
                DiagnosticKind::PayloadMismatch,
                id,
                format!("toggle update carried {} payload", raw.type_name()),
            );
            return;
        };
        let _ = ctx.dispatch(id, &HostValue::Bool(checked));
    }
}
