//! Property-based invariant tests for identifiers, bounds, and dispatch.
//!
//! Verifies:
//! 1. Allocated identifiers are pairwise distinct across any call sequence
//! 2. Repeated (name, kind) allocations share the `<kind>-<kebab>-` prefix
//! 3. clamp lands in [min, max] and is the identity inside the range
//! 4. Slider build leaves the bound value in a finite range
//! 5. Radio build falls back to the first option only for foreign selections
//! 6. dispatch invokes exactly the registered setter, exactly once

use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::rc::Rc;

use proptest::prelude::*;
use wshim_core::control::clamp;
use wshim_core::ids::kebab_case;
use wshim_core::testing::MemoryDocument;
use wshim_core::{
    Bound, Control, FloatSlider, HostValue, IdAllocator, IntSlider, RadioGroup, RuntimeContext,
    UpdateRegistry,
};

fn kind_strategy() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("Toggle"),
        Just("Radio"),
        Just("IntSlider"),
        Just("FloatSlider"),
    ]
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Pairwise distinct identifiers
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn allocated_ids_are_pairwise_distinct(
        calls in proptest::collection::vec(("[a-zA-Z0-9 _-]{0,8}", kind_strategy()), 0..64)
    ) {
        let mut ids = IdAllocator::new();
        let mut seen = HashSet::new();
        for (name, kind) in &calls {
            let id = ids.allocate(name, kind);
            prop_assert!(seen.insert(id.clone()), "duplicate id {}", id);
        }
        prop_assert_eq!(ids.len(), calls.len());
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Shared prefix for repeated pairs
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn repeated_pair_shares_prefix(name in "[a-zA-Z ]{1,12}", kind in kind_strategy(), n in 1usize..16) {
        let mut ids = IdAllocator::new();
        let prefix = format!("{kind}-{}-", kebab_case(&name));
        let issued: HashSet<String> = (0..n).map(|_| ids.allocate(&name, kind)).collect();
        prop_assert_eq!(issued.len(), n);
        for id in &issued {
            prop_assert!(id.starts_with(&prefix), "{} lacks prefix {}", id, prefix);
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Clamp law
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn clamp_lands_in_range(v in any::<i64>(), a in any::<i64>(), b in any::<i64>()) {
        let (min, max) = if a <= b { (a, b) } else { (b, a) };
        let clamped = clamp(v, min, max);
        prop_assert!(min <= clamped && clamped <= max);
        if min <= v && v <= max {
            prop_assert_eq!(clamped, v);
        }
    }

    #[test]
    fn clamp_lands_in_range_f64(v in -1e9f64..1e9, a in -1e6f64..1e6, b in -1e6f64..1e6) {
        let (min, max) = if a <= b { (a, b) } else { (b, a) };
        let clamped = clamp(v, min, max);
        prop_assert!(min <= clamped && clamped <= max);
        if min <= v && v <= max {
            prop_assert_eq!(clamped, v);
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Slider build settles the bound value
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn slider_build_leaves_value_in_range(
        initial in -1_000i64..1_000,
        a in -100i64..100,
        b in -100i64..100,
    ) {
        let ctx = RuntimeContext::new();
        let doc = MemoryDocument::new();
        let value = Bound::new(initial);
        let mut slider = IntSlider::new(&ctx, "Count", a, b, 1, value.clone());
        let _ = Control::<MemoryDocument>::build(&mut slider, &ctx, &doc);

        let (min, max) = (a.min(b), a.max(b));
        prop_assert!(min <= value.get() && value.get() <= max);
        if min <= initial && initial <= max {
            prop_assert_eq!(value.get(), initial);
        }
    }
}

fn bound_strategy() -> impl Strategy<Value = f64> {
    prop_oneof![
        4 => -100.0f64..100.0,
        1 => Just(f64::NAN),
        1 => Just(f64::INFINITY),
        1 => Just(f64::NEG_INFINITY),
    ]
}

proptest! {
    #[test]
    fn float_slider_build_leaves_value_in_finite_range(
        initial in -1_000.0f64..1_000.0,
        a in bound_strategy(),
        b in bound_strategy(),
    ) {
        let ctx = RuntimeContext::new();
        let doc = MemoryDocument::new();
        let value = Bound::new(initial);
        let mut slider = FloatSlider::new(&ctx, "Gain", a, b, 0.1, value.clone());
        let _ = Control::<MemoryDocument>::build(&mut slider, &ctx, &doc);

        let (min, max, _) = slider.bounds();
        prop_assert!(min.is_finite() && max.is_finite());
        prop_assert!(min <= value.get() && value.get() <= max);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. Choice fallback law
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn radio_build_falls_back_to_first(
        options in proptest::collection::vec("[a-z]{1,4}", 1..6),
        initial in "[a-z]{1,4}",
    ) {
        let ctx = RuntimeContext::new();
        let doc = MemoryDocument::new();
        let selected = Bound::new(initial.clone());
        let mut radio = RadioGroup::new(&ctx, "Mode", options.clone(), selected.clone());
        let _ = Control::<MemoryDocument>::build(&mut radio, &ctx, &doc);

        if options.contains(&initial) {
            prop_assert_eq!(selected.get(), initial);
        } else {
            prop_assert_eq!(&selected.get(), &options[0]);
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 6. Dispatch exactly once
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn dispatch_invokes_only_target(count in 1usize..12, target in 0usize..12, x in any::<i32>()) {
        let target = target % count;
        let mut registry = UpdateRegistry::new();
        let calls: Vec<Rc<Cell<u32>>> = (0..count).map(|_| Rc::new(Cell::new(0))).collect();
        let received = Rc::new(RefCell::new(Vec::new()));
        for (index, counter) in calls.iter().enumerate() {
            let counter = Rc::clone(counter);
            let received = Rc::clone(&received);
            registry.register(
                format!("id-{index}"),
                Rc::new(move |value: &HostValue| {
                    counter.set(counter.get() + 1);
                    received.borrow_mut().push(value.clone());
                    Ok(())
                }),
            );
        }

        let value = HostValue::Number(f64::from(x));
        let target_id = format!("id-{target}");
        prop_assert!(registry.dispatch(&target_id, &value).is_ok());
        for (index, counter) in calls.iter().enumerate() {
            prop_assert_eq!(counter.get(), u32::from(index == target));
        }
        prop_assert_eq!(received.borrow().clone(), vec![value]);
    }
}
