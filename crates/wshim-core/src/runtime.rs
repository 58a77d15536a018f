#![forbid(unsafe_code)]

//! Startup orchestration.
//!
//! [`Orchestrator`] is a deterministic state machine over
//! `AwaitingHost → AwaitingPanel → Building → Running → Terminated`. It never
//! sleeps on its own: [`Orchestrator::tick`] probes once and tells the caller
//! when to probe again, so the same machine drives a blocking native loop
//! ([`Runtime::start`]) and a timer-driven browser loop (`wshim-web`).
//!
//! When the host document or the options panel does not appear within the
//! retry policy's timeout, the machine skips straight to `Running` in degraded
//! mode: no panel, no controls, but the embedding program still starts.

use std::collections::{HashSet, VecDeque};
use std::rc::Rc;
use std::time::{Duration, Instant};

use serde::Serialize;
use serde_json::json;

use crate::config::RuntimeConfig;
use crate::context::RuntimeContext;
use crate::control::{Built, Control, ControlKind};
use crate::diagnostics::DiagnosticKind;
use crate::host::{Host, HostDocument, HostHandler, HostValue};

const TRANSITION_LOG_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RuntimeState {
    AwaitingHost,
    AwaitingPanel,
    Building,
    Running,
    Terminated,
}

impl RuntimeState {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AwaitingHost => "awaiting_host",
            Self::AwaitingPanel => "awaiting_panel",
            Self::Building => "building",
            Self::Running => "running",
            Self::Terminated => "terminated",
        }
    }
}

/// What the caller should do after a [`Orchestrator::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Nothing changed; tick again at `at_ms`.
    Retry { at_ms: u64 },
    /// Moved to the next waiting state; tick again immediately.
    Advanced,
    /// Waiting is over: build controls (or skip them, if degraded).
    Ready,
}

/// One recorded state change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuntimeTransition {
    pub seq: u64,
    pub at_ms: u64,
    pub from: RuntimeState,
    pub to: RuntimeState,
    pub reason: &'static str,
}

impl RuntimeTransition {
    /// Serialize one JSONL line for host-side diagnostics.
    #[must_use]
    pub fn to_jsonl_line(&self, run_id: &str) -> String {
        json!({
            "event": "runtime_state_transition",
            "run_id": run_id,
            "ts_ms": self.at_ms,
            "transition_seq": self.seq,
            "from_state": self.from.as_str(),
            "to_state": self.to.as_str(),
            "reason": self.reason,
        })
        .to_string()
    }
}

/// Time source for the blocking startup loop.
pub trait Clock {
    fn now_ms(&self) -> u64;
    fn sleep_ms(&self, ms: u64);
}

/// Wall clock backed by [`Instant`] and [`std::thread::sleep`].
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        u64::try_from(self.origin.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    fn sleep_ms(&self, ms: u64) {
        std::thread::sleep(Duration::from_millis(ms));
    }
}

type Document<H> = <H as Host>::Document;
type Node<H> = <<H as Host>::Document as HostDocument>::Node;

/// Controls supplied to [`Orchestrator::build`], in panel order.
pub type Controls<D> = Vec<Box<dyn Control<D>>>;

pub struct Orchestrator<H: Host> {
    config: RuntimeConfig,
    ctx: Rc<RuntimeContext>,
    host: H,
    state: RuntimeState,
    degraded: bool,
    deadline_ms: Option<u64>,
    document: Option<Document<H>>,
    panel: Option<Node<H>>,
    installed: HashSet<ControlKind>,
    entries: usize,
    transition_seq: u64,
    transitions: VecDeque<RuntimeTransition>,
}

impl<H: Host> std::fmt::Debug for Orchestrator<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("state", &self.state)
            .field("degraded", &self.degraded)
            .field("entries", &self.entries)
            .field("installed", &self.installed)
            .finish_non_exhaustive()
    }
}

impl<H: Host> Orchestrator<H> {
    #[must_use]
    pub fn new(config: RuntimeConfig, ctx: Rc<RuntimeContext>, host: H) -> Self {
        Self {
            config,
            ctx,
            host,
            state: RuntimeState::AwaitingHost,
            degraded: false,
            deadline_ms: None,
            document: None,
            panel: None,
            installed: HashSet::new(),
            entries: 0,
            transition_seq: 0,
            transitions: VecDeque::new(),
        }
    }

    #[must_use]
    pub const fn state(&self) -> RuntimeState {
        self.state
    }

    /// Whether startup gave up on the host or the panel.
    #[must_use]
    pub const fn is_degraded(&self) -> bool {
        self.degraded
    }

    /// Panel entries appended so far.
    #[must_use]
    pub const fn entry_count(&self) -> usize {
        self.entries
    }

    #[must_use]
    pub fn context(&self) -> &Rc<RuntimeContext> {
        &self.ctx
    }

    #[must_use]
    pub fn host(&self) -> &H {
        &self.host
    }

    #[must_use]
    pub fn document(&self) -> Option<&Document<H>> {
        self.document.as_ref()
    }

    /// Kinds whose global handler has been installed.
    #[must_use]
    pub fn installed_kinds(&self) -> &HashSet<ControlKind> {
        &self.installed
    }

    #[must_use]
    pub fn drain_transitions(&mut self) -> Vec<RuntimeTransition> {
        self.transitions.drain(..).collect()
    }

    /// Probe once for whatever the current waiting state needs.
    pub fn tick(&mut self, now_ms: u64) -> Step {
        match self.state {
            RuntimeState::AwaitingHost => self.poll_host(now_ms),
            RuntimeState::AwaitingPanel => self.poll_panel(now_ms),
            RuntimeState::Building | RuntimeState::Running | RuntimeState::Terminated => {
                Step::Ready
            }
        }
    }

    /// Tick until ready, sleeping on `clock` between probes.
    pub fn wait_ready<C: Clock>(&mut self, clock: &C) {
        loop {
            match self.tick(clock.now_ms()) {
                Step::Ready => return,
                Step::Advanced => {}
                Step::Retry { at_ms } => clock.sleep_ms(at_ms.saturating_sub(clock.now_ms())),
            }
        }
    }

    /// Build every control into the panel, in order, then enter `Running`.
    ///
    /// Returns the number of panel entries created. In degraded mode the
    /// controls are dropped unbuilt and nothing is installed.
    pub fn build(&mut self, now_ms: u64, controls: Controls<Document<H>>) -> usize {
        if self.state != RuntimeState::Building {
            if self.degraded {
                tracing::debug!(dropped = controls.len(), "no panel; controls not built");
            } else {
                tracing::debug!(
                    state = self.state.as_str(),
                    "build ignored in current state"
                );
            }
            return 0;
        }
        let (Some(doc), Some(panel)) = (self.document.clone(), self.panel.clone()) else {
            self.ctx.diagnose(
                DiagnosticKind::PanelUnavailable,
                &self.config.panel_id,
                "panel handle lost before build",
            );
            self.enter_degraded(now_ms, "panel_lost");
            return 0;
        };

        let before = self.entries;
        for mut control in controls {
            let built = control.build(&self.ctx, &doc);
            let control: Rc<dyn Control<Document<H>>> = Rc::from(control);
            if self.installed.insert(built.kind) {
                self.install_handler(&doc, built.kind, control);
            }
            let entry = assemble_entry(&doc, &built);
            doc.append_child(&panel, &entry);
            self.entries += 1;
        }

        self.record_transition(now_ms, RuntimeState::Running, "panel_built");
        self.entries - before
    }

    /// Mark the session finished. Only the host's unload path calls this.
    pub fn terminate(&mut self, now_ms: u64) {
        if self.state != RuntimeState::Terminated {
            self.record_transition(now_ms, RuntimeState::Terminated, "terminated");
        }
    }

    fn poll_host(&mut self, now_ms: u64) -> Step {
        let deadline = self.deadline(now_ms);
        if let Some(document) = self.host.probe_document() {
            self.document = Some(document);
            self.deadline_ms = None;
            self.record_transition(now_ms, RuntimeState::AwaitingPanel, "host_ready");
            return Step::Advanced;
        }
        if now_ms >= deadline {
            self.ctx.diagnose(
                DiagnosticKind::HostUnavailable,
                "document",
                format!(
                    "host document not available after {}ms; running without controls",
                    self.config.retry.timeout_ms
                ),
            );
            self.enter_degraded(now_ms, "host_timeout");
            return Step::Ready;
        }
        self.retry_at(now_ms, deadline)
    }

    fn poll_panel(&mut self, now_ms: u64) -> Step {
        let deadline = self.deadline(now_ms);
        let panel = self
            .document
            .as_ref()
            .and_then(|doc| doc.get_element_by_id(&self.config.panel_id));
        if let Some(panel) = panel {
            self.panel = Some(panel);
            self.deadline_ms = None;
            self.record_transition(now_ms, RuntimeState::Building, "panel_ready");
            return Step::Ready;
        }
        if now_ms >= deadline {
            self.ctx.diagnose(
                DiagnosticKind::PanelUnavailable,
                &self.config.panel_id,
                format!(
                    "options panel not found after {}ms; running without controls",
                    self.config.retry.timeout_ms
                ),
            );
            self.enter_degraded(now_ms, "panel_timeout");
            return Step::Ready;
        }
        self.retry_at(now_ms, deadline)
    }

    fn deadline(&mut self, now_ms: u64) -> u64 {
        let timeout = self.config.retry.timeout_ms;
        *self
            .deadline_ms
            .get_or_insert_with(|| now_ms.saturating_add(timeout))
    }

    fn retry_at(&self, now_ms: u64, deadline: u64) -> Step {
        let interval = self.config.retry.poll_interval_ms.max(1);
        Step::Retry {
            at_ms: now_ms.saturating_add(interval).min(deadline),
        }
    }

    fn enter_degraded(&mut self, now_ms: u64, reason: &'static str) {
        self.degraded = true;
        self.deadline_ms = None;
        self.record_transition(now_ms, RuntimeState::Running, reason);
    }

    fn install_handler(
        &mut self,
        doc: &Document<H>,
        kind: ControlKind,
        control: Rc<dyn Control<Document<H>>>,
    ) {
        let name = kind.handler_name();
        tracing::debug!(kind = kind.as_str(), handler = %name, "installing update handler");
        let ctx = Rc::clone(&self.ctx);
        let doc = doc.clone();
        let handler: HostHandler = Rc::new(move |args: &[HostValue]| {
            control.handle_update(&ctx, &doc, args);
        });
        self.host.install_handler(&name, handler);
    }

    fn record_transition(&mut self, now_ms: u64, to: RuntimeState, reason: &'static str) {
        let from = self.state;
        self.state = to;
        self.transition_seq = self.transition_seq.saturating_add(1);
        tracing::debug!(
            from = from.as_str(),
            to = to.as_str(),
            reason,
            at_ms = now_ms,
            "runtime transition"
        );
        if self.transitions.len() >= TRANSITION_LOG_CAPACITY {
            let _ = self.transitions.pop_front();
        }
        self.transitions.push_back(RuntimeTransition {
            seq: self.transition_seq,
            at_ms: now_ms,
            from,
            to,
            reason,
        });
    }
}

/// `<div class=option><label/><div class=inputBox>nodes…</div></div>`
fn assemble_entry<D: HostDocument>(doc: &D, built: &Built<D::Node>) -> D::Node {
    let label = doc.create_element("label");
    doc.set_attribute(&label, "for", &built.label_for);
    doc.set_attribute(&label, "class", "optionLabel");
    let text = doc.create_text_node(&built.label);
    doc.append_child(&label, &text);

    let input_box = doc.create_element("div");
    doc.set_attribute(&input_box, "class", "inputBox");
    for node in &built.nodes {
        doc.append_child(&input_box, node);
    }

    let option = doc.create_element("div");
    doc.set_attribute(&option, "class", "option");
    doc.append_child(&option, &label);
    doc.append_child(&option, &input_box);
    option
}

/// Entry point for embedding programs.
///
/// Owns the one [`RuntimeContext`] of the process. Construct controls
/// against [`Runtime::context`], then hand them to [`Runtime::start`] or
/// [`Runtime::run`].
#[derive(Debug)]
pub struct Runtime {
    config: RuntimeConfig,
    ctx: Rc<RuntimeContext>,
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new(RuntimeConfig::default())
    }
}

impl Runtime {
    #[must_use]
    pub fn new(config: RuntimeConfig) -> Self {
        if let Err(errors) = config.validate() {
            for error in errors {
                tracing::warn!(field = error.field, value = %error.value, "{}", error.message);
            }
        }
        Self {
            config,
            ctx: Rc::new(RuntimeContext::new()),
        }
    }

    #[must_use]
    pub fn context(&self) -> &Rc<RuntimeContext> {
        &self.ctx
    }

    #[must_use]
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// State machine for hosts that schedule their own probes.
    #[must_use]
    pub fn orchestrator<H: Host>(&self, host: H) -> Orchestrator<H> {
        Orchestrator::new(self.config.clone(), Rc::clone(&self.ctx), host)
    }

    /// Wait for the host, build the panel, and call `entry` exactly once.
    ///
    /// Returns the running session; the caller keeps it alive for as long as
    /// host events may arrive.
    pub fn start<H, C, F>(
        self,
        host: H,
        controls: Controls<H::Document>,
        clock: &C,
        entry: F,
    ) -> Session<H>
    where
        H: Host,
        C: Clock,
        F: FnOnce(),
    {
        tracing::info!(
            controls = controls.len(),
            panel_id = %self.config.panel_id,
            "starting wshim runtime"
        );
        let mut orchestrator = self.orchestrator(host);
        orchestrator.wait_ready(clock);
        let built = orchestrator.build(clock.now_ms(), controls);
        tracing::info!(
            entries = built,
            degraded = orchestrator.is_degraded(),
            "options panel ready"
        );
        entry();
        Session { orchestrator }
    }

    /// [`Runtime::start`], then block the calling thread forever.
    pub fn run<H, C, F>(self, host: H, controls: Controls<H::Document>, clock: &C, entry: F) -> !
    where
        H: Host,
        C: Clock,
        F: FnOnce(),
    {
        let _session = self.start(host, controls, clock, entry);
        loop {
            std::thread::park();
        }
    }
}

/// A started runtime. Host events keep flowing while it is alive.
pub struct Session<H: Host> {
    orchestrator: Orchestrator<H>,
}

impl<H: Host> std::fmt::Debug for Session<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("orchestrator", &self.orchestrator)
            .finish()
    }
}

impl<H: Host> Session<H> {
    #[must_use]
    pub const fn state(&self) -> RuntimeState {
        self.orchestrator.state()
    }

    #[must_use]
    pub const fn is_degraded(&self) -> bool {
        self.orchestrator.is_degraded()
    }

    #[must_use]
    pub const fn entry_count(&self) -> usize {
        self.orchestrator.entry_count()
    }

    #[must_use]
    pub fn context(&self) -> &Rc<RuntimeContext> {
        self.orchestrator.context()
    }

    #[must_use]
    pub fn host(&self) -> &H {
        self.orchestrator.host()
    }

    #[must_use]
    pub fn drain_transitions(&mut self) -> Vec<RuntimeTransition> {
        self.orchestrator.drain_transitions()
    }

    pub fn terminate(&mut self, now_ms: u64) {
        self.orchestrator.terminate(now_ms);
    }
}
