#![forbid(unsafe_code)]

//! Timer-driven startup for the browser.
//!
//! The core's poll loop blocks on a [`wshim_core::Clock`]; the browser cannot
//! block, so this module ticks the same [`wshim_core::Orchestrator`] from a
//! `setTimeout` promise chain and returns control to the event loop between
//! probes.

use js_sys::{Promise, Reflect};
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::{JsFuture, spawn_local};
use wshim_core::{Controls, Runtime, RuntimeConfig, RuntimeContext};

use crate::document::WebDocument;
use crate::host::WebHost;
use crate::schedule::next_delay_ms;

/// Write `msg` through `console[method]`, ignoring hosts without a console.
fn console(method: &str, msg: &str) {
    let global = js_sys::global();
    let write = Reflect::get(&global, &"console".into()).and_then(|console| {
        let method = Reflect::get(&console, &method.into())?;
        Ok((console, method))
    });
    if let Ok((console, method)) = write
        && let Ok(method) = method.dyn_into::<js_sys::Function>()
    {
        let _ = method.call1(&console, &JsValue::from_str(msg));
    }
}

/// Route panics to `console.error`. Installed once per module, on first launch.
fn install_panic_hook() {
    use std::sync::Once;

    static ONCE: Once = Once::new();
    ONCE.call_once(|| {
        std::panic::set_hook(Box::new(|info| {
            let msg = info.location().map_or_else(
                || format!("wshim panic: {info}"),
                |loc| format!("wshim panic at {}:{}: {info}", loc.file(), loc.line()),
            );
            console("error", &msg);
        }));
    });
}

/// Startup diagnostics go to `console.warn`; pages run no `tracing` subscriber.
fn report_diagnostics(ctx: &RuntimeContext) {
    for diagnostic in ctx.take_diagnostics() {
        console("warn", &format!("wshim {diagnostic}"));
    }
}

fn now_ms(origin: f64) -> u64 {
    let elapsed = js_sys::Date::now() - origin;
    if elapsed.is_finite() && elapsed > 0.0 {
        elapsed as u64
    } else {
        0
    }
}

async fn sleep_ms(delay: i32) {
    let promise = Promise::new(&mut |resolve, _reject| {
        let scheduled = web_sys::window()
            .map(|window| {
                window
                    .set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, delay)
                    .is_ok()
            })
            .unwrap_or(false);
        if !scheduled {
            let _ = resolve.call0(&JsValue::UNDEFINED);
        }
    });
    let _ = JsFuture::from(promise).await;
}

/// Start with default configuration and the parent-frame host.
///
/// `controls` receives the runtime context to construct controls against;
/// `entry` runs exactly once, after the panel is built or abandoned.
pub fn launch<C, F>(controls: C, entry: F)
where
    C: FnOnce(&RuntimeContext) -> Controls<WebDocument>,
    F: FnOnce() + 'static,
{
    launch_with(RuntimeConfig::default(), WebHost::default(), controls, entry);
}

pub fn launch_with<C, F>(config: RuntimeConfig, host: WebHost, controls: C, entry: F)
where
    C: FnOnce(&RuntimeContext) -> Controls<WebDocument>,
    F: FnOnce() + 'static,
{
    install_panic_hook();
    let runtime = Runtime::new(config);
    let controls = controls(runtime.context());
    tracing::info!(
        controls = controls.len(),
        target = host.target().as_str(),
        panel_id = %runtime.config().panel_id,
        "starting wshim runtime"
    );

    spawn_local(async move {
        let origin = js_sys::Date::now();
        let mut orchestrator = runtime.orchestrator(host);
        loop {
            let now = now_ms(origin);
            match next_delay_ms(orchestrator.tick(now), now) {
                Some(delay) => sleep_ms(delay).await,
                None => break,
            }
        }
        let built = orchestrator.build(now_ms(origin), controls);
        tracing::info!(
            entries = built,
            degraded = orchestrator.is_degraded(),
            "options panel ready"
        );
        report_diagnostics(orchestrator.context());
        entry();
    });
}
