#![forbid(unsafe_code)]

//! The control contract and its variants.
//!
//! Every control exposes two operations:
//!
//! - [`Control::build`] corrects the bound initial value if needed, registers
//!   a setter for its identifier, and returns the constructed nodes together
//!   with the metadata the orchestrator needs to lay out a panel entry.
//! - [`Control::handle_update`] is the kind-level host handler. One instance
//!   per kind serves every instance of that kind: it only decodes the raw
//!   event, dispatches by identifier, and resyncs sibling widgets.
//!
//! `build` is called at most once per instance.

mod radio;
mod slider;
mod toggle;

pub use radio::RadioGroup;
pub use slider::{FloatSlider, IntSlider, Slider, SliderValue};
pub use toggle::Toggle;

use crate::context::RuntimeContext;
use crate::diagnostics::DiagnosticKind;
use crate::host::{HostDocument, HostValue};

/// Control archetypes. The tag doubles as the identifier kind prefix and
/// the stem of the global handler name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlKind {
    Toggle,
    Radio,
    IntSlider,
    FloatSlider,
}

impl ControlKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Toggle => "Toggle",
            Self::Radio => "Radio",
            Self::IntSlider => "IntSlider",
            Self::FloatSlider => "FloatSlider",
        }
    }

    /// Name of the global handler the host markup calls, e.g. `ToggleUpdate`.
    #[must_use]
    pub fn handler_name(self) -> String {
        format!("{}Update", self.as_str())
    }
}

/// Output of [`Control::build`].
#[derive(Debug, Clone)]
pub struct Built<N> {
    /// Human-readable label shown next to the control.
    pub label: String,
    /// Logical identifier the setter is registered under.
    pub id: String,
    /// Element identifier the panel label should point at.
    pub label_for: String,
    pub kind: ControlKind,
    pub nodes: Vec<N>,
}

pub trait Control<D: HostDocument> {
    fn kind(&self) -> ControlKind;

    fn id(&self) -> &str;

    fn build(&mut self, ctx: &RuntimeContext, doc: &D) -> Built<D::Node>;

    fn handle_update(&self, ctx: &RuntimeContext, doc: &D, args: &[HostValue]);
}

/// Clamp `value` into `[min, max]`. Requires `min <= max`.
#[must_use]
pub fn clamp<T: PartialOrd>(value: T, min: T, max: T) -> T {
    if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}

/// Split `(identifier, value)` out of raw handler arguments.
///
/// Records a diagnostic and returns `None` when the shape is wrong.
pub(crate) fn event_args<'a>(
    ctx: &RuntimeContext,
    kind: ControlKind,
    args: &'a [HostValue],
) -> Option<(&'a str, &'a HostValue)> {
    match args {
        [HostValue::Text(id), value, ..] => Some((id.as_str(), value)),
        _ => {
            ctx.diagnose(
                DiagnosticKind::MalformedEvent,
                kind.as_str(),
                format!("expected (identifier, value), got {} argument(s)", args.len()),
            );
            None
        }
    }
}

/// `"checked"` for checkbox and radio attributes.
pub(crate) const CHECKED: &str = "checked";
