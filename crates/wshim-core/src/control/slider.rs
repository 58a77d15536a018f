#![forbid(unsafe_code)]

//! Numeric sliders.
//!
//! A slider renders two mirrored widgets for one logical identifier: a range
//! input (`s<id>`) and a numeric readout (`n<id>`). Either may fire; the
//! handler strips the one-character prefix to find the logical identifier
//! and copies the new value into the other widget.
//!
//! Range and step are enforced when the control is built. Updates trust the
//! host's `min`/`max`/`step` attributes and are not re-validated.

use std::fmt;
use std::rc::Rc;

use super::{Built, Control, ControlKind, clamp, event_args};
use crate::binding::{Bound, ChangeCallback};
use crate::context::RuntimeContext;
use crate::diagnostics::DiagnosticKind;
use crate::host::{HostDocument, HostValue};
use crate::registry::PayloadError;

const RANGE_PREFIX: char = 's';
const READOUT_PREFIX: char = 'n';

/// Numeric types a [`Slider`] can bind.
pub trait SliderValue: Copy + PartialOrd + fmt::Debug + fmt::Display + 'static {
    const KIND: ControlKind;
    /// JS conversion applied to `this.value` in the inline handler.
    const PARSE_FN: &'static str;
    /// Payload name used in mismatch diagnostics.
    const PAYLOAD: &'static str;
    const DEFAULT_STEP: Self;
    const ZERO: Self;

    fn from_host(value: &HostValue) -> Option<Self>;
    fn to_host(self) -> HostValue;
    fn is_valid_step(step: Self) -> bool;

    fn is_nan(self) -> bool {
        false
    }

    fn is_finite(self) -> bool {
        true
    }
}

impl SliderValue for i64 {
    const KIND: ControlKind = ControlKind::IntSlider;
    const PARSE_FN: &'static str = "parseInt";
    const PAYLOAD: &'static str = "integer";
    const DEFAULT_STEP: Self = 1;
    const ZERO: Self = 0;

    fn from_host(value: &HostValue) -> Option<Self> {
        value.as_i64()
    }

    fn to_host(self) -> HostValue {
        HostValue::from(self)
    }

    fn is_valid_step(step: Self) -> bool {
        step > 0
    }
}

impl SliderValue for f64 {
    const KIND: ControlKind = ControlKind::FloatSlider;
    const PARSE_FN: &'static str = "parseFloat";
    const PAYLOAD: &'static str = "number";
    const DEFAULT_STEP: Self = 0.01;
    const ZERO: Self = 0.0;

    fn from_host(value: &HostValue) -> Option<Self> {
        value.as_f64().filter(|n| !n.is_nan())
    }

    fn to_host(self) -> HostValue {
        HostValue::Number(self)
    }

    fn is_valid_step(step: Self) -> bool {
        step.is_finite() && step > 0.0
    }

    fn is_nan(self) -> bool {
        f64::is_nan(self)
    }

    fn is_finite(self) -> bool {
        f64::is_finite(self)
    }
}

/// Range input plus numeric readout bound to one number in `[min, max]`.
pub struct Slider<V: SliderValue> {
    name: String,
    id: String,
    min: V,
    max: V,
    step: V,
    value: Bound<V>,
    on_change: Option<ChangeCallback<V>>,
}

pub type IntSlider = Slider<i64>;
pub type FloatSlider = Slider<f64>;

impl<V: SliderValue> Slider<V> {
    pub fn new(
        ctx: &RuntimeContext,
        name: impl Into<String>,
        min: V,
        max: V,
        step: V,
        value: Bound<V>,
    ) -> Self {
        let name = name.into();
        let id = ctx.allocate_id(&name, V::KIND.as_str());
        Self {
            name,
            id,
            min,
            max,
            step,
            value,
            on_change: None,
        }
    }

    #[must_use]
    pub fn on_change(mut self, f: impl Fn(&V, &V) + 'static) -> Self {
        self.on_change = Some(Rc::new(f));
        self
    }

    #[must_use]
    pub fn bounds(&self) -> (V, V, V) {
        (self.min, self.max, self.step)
    }

    /// Repair bounds and step, then pull the bound value into range.
    fn settle(&mut self, ctx: &RuntimeContext) {
        let repaired = match (self.min.is_finite(), self.max.is_finite()) {
            (true, true) => None,
            (true, false) => Some((self.min, self.min)),
            (false, true) => Some((self.max, self.max)),
            (false, false) => Some((V::ZERO, V::ZERO)),
        };
        if let Some((min, max)) = repaired {
            ctx.diagnose(
                DiagnosticKind::InvalidBounds,
                &self.id,
                format!(
                    "bounds [{}, {}] are not finite; using [{min}, {max}]",
                    self.min, self.max
                ),
            );
            self.min = min;
            self.max = max;
        }
        if self.max < self.min {
            ctx.diagnose(
                DiagnosticKind::InvalidBounds,
                &self.id,
                format!("min {} exceeds max {}; swapping", self.min, self.max),
            );
            std::mem::swap(&mut self.min, &mut self.max);
        }
        if !V::is_valid_step(self.step) {
            ctx.diagnose(
                DiagnosticKind::InvalidBounds,
                &self.id,
                format!("step {} is not positive; using {}", self.step, V::DEFAULT_STEP),
            );
            self.step = V::DEFAULT_STEP;
        }

        let initial = self.value.get();
        let settled = if initial.is_nan() {
            self.min
        } else {
            clamp(initial, self.min, self.max)
        };
        if initial.is_nan() || settled != initial {
            ctx.diagnose(
                DiagnosticKind::ValueClamped,
                &self.id,
                format!(
                    "initial {initial} outside [{}, {}]; clamped to {settled}",
                    self.min, self.max
                ),
            );
            self.value.replace(settled);
        } else {
            tracing::debug!(id = %self.id, initial = %initial, "initial value registered");
        }
    }

    fn widget<D: HostDocument>(&self, doc: &D, prefix: char, class: &str, value: V) -> D::Node {
        let kind = V::KIND;
        let input = doc.create_element("input");
        let input_type = if prefix == RANGE_PREFIX {
            "range"
        } else {
            "number"
        };
        doc.set_attribute(&input, "type", input_type);
        doc.set_attribute(&input, "id", &format!("{prefix}{}", self.id));
        doc.set_attribute(&input, "class", class);
        doc.set_attribute(&input, "min", &self.min.to_string());
        doc.set_attribute(&input, "max", &self.max.to_string());
        doc.set_attribute(&input, "step", &self.step.to_string());
        doc.set_attribute(&input, "value", &value.to_string());
        doc.set_attribute(
            &input,
            "oninput",
            &format!("{}(this.id, {}(this.value))", kind.handler_name(), V::PARSE_FN),
        );
        input
    }
}

/// Which of the two mirrored widgets fired, resolved from its element id.
#[derive(Debug, Clone, PartialEq, Eq)]
struct WidgetRef<'a> {
    logical: &'a str,
    sibling: String,
}

impl<'a> WidgetRef<'a> {
    fn parse(element_id: &'a str) -> Option<Self> {
        let mut chars = element_id.chars();
        let prefix = chars.next()?;
        let logical = chars.as_str();
        let sibling_prefix = match prefix {
            RANGE_PREFIX => READOUT_PREFIX,
            READOUT_PREFIX => RANGE_PREFIX,
            _ => return None,
        };
        if logical.is_empty() {
            return None;
        }
        Some(Self {
            logical,
            sibling: format!("{sibling_prefix}{logical}"),
        })
    }
}

impl<D: HostDocument, V: SliderValue> Control<D> for Slider<V> {
    fn kind(&self) -> ControlKind {
        V::KIND
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn build(&mut self, ctx: &RuntimeContext, doc: &D) -> Built<D::Node> {
        tracing::debug!(
            name = %self.name,
            id = %self.id,
            min = %self.min,
            max = %self.max,
            step = %self.step,
            "building slider"
        );
        self.settle(ctx);
        let initial = self.value.get();
        let range = self.widget(doc, RANGE_PREFIX, "optionSlider", initial);
        let readout = self.widget(doc, READOUT_PREFIX, "optionNumber", initial);

        let bound = self.value.clone();
        let on_change = self.on_change.clone();
        ctx.register(
            &self.id,
            Rc::new(move |raw: &HostValue| {
                let next = V::from_host(raw).ok_or_else(|| PayloadError::new(V::PAYLOAD, raw))?;
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
            label_for: format!("{RANGE_PREFIX}{}", self.id),
            kind: V::KIND,
            nodes: vec![range, readout],
        }
    }

    fn handle_update(&self, ctx: &RuntimeContext, doc: &D, args: &[HostValue]) {
        let Some((element_id, raw)) = event_args(ctx, V::KIND, args) else {
            return;
        };
        let Some(widget) = WidgetRef::parse(element_id) else {
            ctx.diagnose(
                DiagnosticKind::UnrecognizedWidget,
                element_id,
                format!("expected a '{RANGE_PREFIX}' or '{READOUT_PREFIX}' prefixed slider id"),
            );
            return;
        };
        let Some(value) = V::from_host(raw) else {
            ctx.diagnose(
                DiagnosticKind::PayloadMismatch,
                widget.logical,
                format!(
                    "slider update carried {} payload, expected {}",
                    raw.type_name(),
                    V::PAYLOAD
                ),
            );
            return;
        };
        let value = value.to_host();
        if ctx.dispatch(widget.logical, &value).is_err() {
            return;
        }
        match doc.get_element_by_id(&widget.sibling) {
            Some(sibling) => doc.set_property(&sibling, "value", &value),
            None => ctx.diagnose(
                DiagnosticKind::MissingSibling,
                &widget.sibling,
                "sibling widget not found; readout left stale",
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MemoryDocument, NodeId};
    use std::cell::RefCell;

    fn build<V: SliderValue>(
        slider: &mut Slider<V>,
        ctx: &RuntimeContext,
        doc: &MemoryDocument,
    ) -> Built<NodeId> {
        let built = Control::<MemoryDocument>::build(slider, ctx, doc);
        for node in &built.nodes {
            doc.append_child(&doc.root(), node);
        }
        built
    }

    #[test]
    fn out_of_range_initial_is_clamped_to_max() {
        let ctx = RuntimeContext::new();
        let doc = MemoryDocument::new();
        let count = Bound::new(15_i64);
        let mut slider = IntSlider::new(&ctx, "Count", 0, 10, 1, count.clone());
        let built = build(&mut slider, &ctx, &doc);

        assert_eq!(count.get(), 10);
        assert!(ctx.has_diagnostic(DiagnosticKind::ValueClamped));
        assert_eq!(doc.attribute(built.nodes[0], "value").as_deref(), Some("10"));
    }

    #[test]
    fn in_range_initial_is_untouched() {
        let ctx = RuntimeContext::new();
        let doc = MemoryDocument::new();
        let ratio = Bound::new(0.5_f64);
        let mut slider = FloatSlider::new(&ctx, "Ratio", 0.0, 1.0, 0.1, ratio.clone());
        build(&mut slider, &ctx, &doc);

        assert_eq!(ratio.get(), 0.5);
        assert_eq!(ratio.version(), 0);
        assert!(ctx.take_diagnostics().is_empty());
    }

    #[test]
    fn widgets_carry_prefixed_ids_and_handlers() {
        let ctx = RuntimeContext::new();
        let doc = MemoryDocument::new();
        let mut slider = IntSlider::new(&ctx, "Count", 0, 10, 2, Bound::new(4));
        let built = build(&mut slider, &ctx, &doc);
        let (range, readout) = (built.nodes[0], built.nodes[1]);

        assert_eq!(built.label_for, "sIntSlider-count-0");
        assert_eq!(doc.attribute(range, "id").as_deref(), Some("sIntSlider-count-0"));
        assert_eq!(doc.attribute(range, "type").as_deref(), Some("range"));
        assert_eq!(doc.attribute(range, "step").as_deref(), Some("2"));
        assert_eq!(doc.attribute(readout, "id").as_deref(), Some("nIntSlider-count-0"));
        assert_eq!(doc.attribute(readout, "type").as_deref(), Some("number"));
        assert_eq!(
            doc.attribute(range, "oninput").as_deref(),
            Some("IntSliderUpdate(this.id, parseInt(this.value))")
        );
    }

    #[test]
    fn range_update_syncs_readout() {
        let ctx = RuntimeContext::new();
        let doc = MemoryDocument::new();
        let speed = Bound::new(1.0_f64);
        let mut slider = FloatSlider::new(&ctx, "Speed", 0.0, 5.0, 0.5, speed.clone());
        let built = build(&mut slider, &ctx, &doc);

        Control::<MemoryDocument>::handle_update(
            &slider,
            &ctx,
            &doc,
            &[HostValue::from("sFloatSlider-speed-0"), HostValue::Number(2.5)],
        );
        assert_eq!(speed.get(), 2.5);
        assert_eq!(doc.property(built.nodes[1], "value"), Some(HostValue::Number(2.5)));
        assert_eq!(doc.property(built.nodes[0], "value"), None);
    }

    #[test]
    fn readout_update_syncs_range() {
        let ctx = RuntimeContext::new();
        let doc = MemoryDocument::new();
        let count = Bound::new(3_i64);
        let mut slider = IntSlider::new(&ctx, "Count", 0, 10, 1, count.clone());
        let built = build(&mut slider, &ctx, &doc);

        Control::<MemoryDocument>::handle_update(
            &slider,
            &ctx,
            &doc,
            &[HostValue::from("nIntSlider-count-0"), HostValue::Number(7.0)],
        );
        assert_eq!(count.get(), 7);
        assert_eq!(doc.property(built.nodes[0], "value"), Some(HostValue::Number(7.0)));
    }

    #[test]
    fn missing_sibling_still_updates_value() {
        let ctx = RuntimeContext::new();
        let doc = MemoryDocument::new();
        let count = Bound::new(3_i64);
        let mut slider = IntSlider::new(&ctx, "Count", 0, 10, 1, count.clone());
        // Built but never attached: lookups fail.
        let _ = Control::<MemoryDocument>::build(&mut slider, &ctx, &doc);

        Control::<MemoryDocument>::handle_update(
            &slider,
            &ctx,
            &doc,
            &[HostValue::from("sIntSlider-count-0"), HostValue::Number(4.0)],
        );
        assert_eq!(count.get(), 4);
        assert!(ctx.has_diagnostic(DiagnosticKind::MissingSibling));
    }

    #[test]
    fn unprefixed_id_is_rejected() {
        let ctx = RuntimeContext::new();
        let doc = MemoryDocument::new();
        let count = Bound::new(3_i64);
        let mut slider = IntSlider::new(&ctx, "Count", 0, 10, 1, count.clone());
        build(&mut slider, &ctx, &doc);

        Control::<MemoryDocument>::handle_update(
            &slider,
            &ctx,
            &doc,
            &[HostValue::from("IntSlider-count-0"), HostValue::Number(4.0)],
        );
        assert_eq!(count.get(), 3);
        assert!(ctx.has_diagnostic(DiagnosticKind::UnrecognizedWidget));
    }

    #[test]
    fn inverted_bounds_and_bad_step_are_repaired() {
        let ctx = RuntimeContext::new();
        let doc = MemoryDocument::new();
        let level = Bound::new(50_i64);
        let mut slider = IntSlider::new(&ctx, "Level", 10, 0, 0, level.clone());
        build(&mut slider, &ctx, &doc);

        assert_eq!(slider.bounds(), (0, 10, 1));
        assert_eq!(level.get(), 10);
        let kinds: Vec<DiagnosticKind> = ctx.take_diagnostics().iter().map(|d| d.kind).collect();
        assert_eq!(
            kinds,
            vec![
                DiagnosticKind::InvalidBounds,
                DiagnosticKind::InvalidBounds,
                DiagnosticKind::ValueClamped,
            ]
        );
    }

    #[test]
    fn nan_bound_collapses_onto_finite_bound() {
        let ctx = RuntimeContext::new();
        let doc = MemoryDocument::new();
        let gain = Bound::new(-5.0_f64);
        let mut slider = FloatSlider::new(&ctx, "Gain", f64::NAN, 1.0, 0.1, gain.clone());
        build(&mut slider, &ctx, &doc);

        assert_eq!(slider.bounds(), (1.0, 1.0, 0.1));
        assert_eq!(gain.get(), 1.0);
        let kinds: Vec<DiagnosticKind> = ctx.take_diagnostics().iter().map(|d| d.kind).collect();
        assert_eq!(
            kinds,
            vec![DiagnosticKind::InvalidBounds, DiagnosticKind::ValueClamped]
        );
    }

    #[test]
    fn infinite_bound_never_reaches_markup() {
        let ctx = RuntimeContext::new();
        let doc = MemoryDocument::new();
        let gain = Bound::new(0.5_f64);
        let mut slider = FloatSlider::new(&ctx, "Gain", 0.0, f64::INFINITY, 0.1, gain.clone());
        let built = build(&mut slider, &ctx, &doc);

        assert_eq!(slider.bounds(), (0.0, 0.0, 0.1));
        assert_eq!(gain.get(), 0.0);
        assert!(ctx.has_diagnostic(DiagnosticKind::InvalidBounds));
        for node in &built.nodes {
            assert_eq!(doc.attribute(*node, "max").as_deref(), Some("0"));
        }
    }

    #[test]
    fn both_bounds_non_finite_fall_back_to_zero() {
        let ctx = RuntimeContext::new();
        let doc = MemoryDocument::new();
        let gain = Bound::new(3.0_f64);
        let mut slider =
            FloatSlider::new(&ctx, "Gain", f64::NEG_INFINITY, f64::NAN, 0.1, gain.clone());
        build(&mut slider, &ctx, &doc);

        assert_eq!(slider.bounds(), (0.0, 0.0, 0.1));
        assert_eq!(gain.get(), 0.0);
    }

    #[test]
    fn nan_initial_falls_back_to_min() {
        let ctx = RuntimeContext::new();
        let doc = MemoryDocument::new();
        let gain = Bound::new(f64::NAN);
        let mut slider = FloatSlider::new(&ctx, "Gain", -1.0, 1.0, 0.25, gain.clone());
        build(&mut slider, &ctx, &doc);
        assert_eq!(gain.get(), -1.0);
        assert!(ctx.has_diagnostic(DiagnosticKind::ValueClamped));
    }

    #[test]
    fn callback_sees_old_value_in_place() {
        let ctx = RuntimeContext::new();
        let doc = MemoryDocument::new();
        let count = Bound::new(1_i64);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let observed = count.clone();
        let log = Rc::clone(&seen);
        let mut slider = IntSlider::new(&ctx, "Count", 0, 10, 1, count.clone())
            .on_change(move |old, new| log.borrow_mut().push((*old, *new, observed.get())));
        build(&mut slider, &ctx, &doc);

        Control::<MemoryDocument>::handle_update(
            &slider,
            &ctx,
            &doc,
            &[HostValue::from("sIntSlider-count-0"), HostValue::Number(6.0)],
        );
        assert_eq!(*seen.borrow(), vec![(1, 6, 1)]);
        assert_eq!(count.get(), 6);
    }

    #[test]
    fn widget_ref_resolves_sibling() {
        let range = WidgetRef::parse("sFloatSlider-x-0").expect("range id parses");
        assert_eq!(range.logical, "FloatSlider-x-0");
        assert_eq!(range.sibling, "nFloatSlider-x-0");
        let readout = WidgetRef::parse("nFloatSlider-x-0").expect("readout id parses");
        assert_eq!(readout.sibling, "sFloatSlider-x-0");
        assert_eq!(WidgetRef::parse("s"), None);
        assert_eq!(WidgetRef::parse(""), None);
        assert_eq!(WidgetRef::parse("xFloatSlider-x-0"), None);
    }
}
