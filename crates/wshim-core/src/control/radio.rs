#![forbid(unsafe_code)]

use std::rc::Rc;

use super::{Built, CHECKED, Control, ControlKind, event_args};
use crate::binding::{Bound, ChangeCallback};
use crate::context::RuntimeContext;
use crate::diagnostics::DiagnosticKind;
use crate::host::{HostDocument, HostValue};
use crate::registry::PayloadError;

/// Exclusive choice among a fixed, ordered set of strings.
///
/// After `build`, the bound value is one of the allowed values: an initial
/// selection outside the set is replaced by the first allowed value.
pub struct RadioGroup {
    name: String,
    id: String,
    options: Vec<String>,
    selected: Bound<String>,
    on_change: Option<ChangeCallback<String>>,
}

impl RadioGroup {
    pub fn new<I, S>(
        ctx: &RuntimeContext,
        name: impl Into<String>,
        options: I,
        selected: Bound<String>,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = name.into();
        let id = ctx.allocate_id(&name, ControlKind::Radio.as_str());
        Self {
            name,
            id,
            options: options.into_iter().map(Into::into).collect(),
            selected,
            on_change: None,
        }
    }

    #[must_use]
    pub fn on_change(mut self, f: impl Fn(&String, &String) + 'static) -> Self {
        self.on_change = Some(Rc::new(f));
        self
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    /// Index of the current selection, replacing it with the first option
    /// when it is not in the set.
    fn settle_selection(&self, ctx: &RuntimeContext) -> Option<usize> {
        let current = self.selected.get();
        if let Some(index) = self.options.iter().position(|option| *option == current) {
            tracing::debug!(id = %self.id, initial = %current, "initial selection registered");
            return Some(index);
        }
        let Some(fallback) = self.options.first() else {
            ctx.diagnose(
                DiagnosticKind::SelectionReplaced,
                &self.id,
                format!("no options to choose from; keeping {current:?}"),
            );
            return None;
        };
        ctx.diagnose(
            DiagnosticKind::SelectionReplaced,
            &self.id,
            format!("{current:?} is not an option; falling back to {fallback:?}"),
        );
        self.selected.replace(fallback.clone());
        Some(0)
    }
}

impl<D: HostDocument> Control<D> for RadioGroup {
    fn kind(&self) -> ControlKind {
        ControlKind::Radio
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn build(&mut self, ctx: &RuntimeContext, doc: &D) -> Built<D::Node> {
        tracing::debug!(
            name = %self.name,
            id = %self.id,
            options = ?self.options,
            "building radio group"
        );
        let checked_index = self.settle_selection(ctx);
        let onchange = format!("{}(this.name, this.value)", ControlKind::Radio.handler_name());

        let mut nodes = Vec::with_capacity(3 * self.options.len());
        for (index, option) in self.options.iter().enumerate() {
            let option_id = format!("{}-{index}", self.id);

            let radio = doc.create_element("input");
            doc.set_attribute(&radio, "type", "radio");
            doc.set_attribute(&radio, "id", &option_id);
            doc.set_attribute(&radio, "name", &self.id);
            doc.set_attribute(&radio, "value", option);
            doc.set_attribute(&radio, "onchange", &onchange);
            if checked_index == Some(index) {
                doc.set_attribute(&radio, CHECKED, CHECKED);
            }

            let label = doc.create_element("label");
            doc.set_attribute(&label, "for", &option_id);
            let text = doc.create_text_node(option);
            doc.append_child(&label, &text);

            let br = doc.create_element("br");
            nodes.extend([radio, label, br]);
        }

        let bound = self.selected.clone();
        let on_change = self.on_change.clone();
        ctx.register(
            &self.id,
            Rc::new(move |raw: &HostValue| {
                let next = raw
                    .as_str()
                    .ok_or_else(|| PayloadError::new("text", raw))?
                    .to_owned();
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
            label_for: checked_index
                .map_or_else(|| self.id.clone(), |index| format!("{}-{index}", self.id)),
            kind: ControlKind::Radio,
            nodes,
        }
    }

    fn handle_update(&self, ctx: &RuntimeContext, _doc: &D, args: &[HostValue]) {
        // Radio inputs report their shared group name, which is the identifier.
        let Some((id, raw)) = event_args(ctx, ControlKind::Radio, args) else {
            return;
        };
        let _ = ctx.dispatch(id, raw);
    }
}
