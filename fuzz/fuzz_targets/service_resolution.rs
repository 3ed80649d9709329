#![no_main]

use keyed_di::{service, Container, DiError};
use libfuzzer_sys::fuzz_target;
use std::sync::Arc;

const SLOTS: usize = 16;

fn id(slot: usize) -> String {
    format!("svc{}", slot % SLOTS)
}

fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }

    let mut builder = Container::builder();
    let (ops, lookups) = data.split_at(data.len() / 2);

    // Each op byte registers one slot; aliases and factories only reference
    // lower slots so resolution always terminates.
    for (slot, op) in ops.iter().take(SLOTS).enumerate() {
        let target = if slot == 0 { None } else { Some(id(*op as usize % slot)) };
        builder = match (op % 5, target) {
            (0, _) => builder.instance(id(slot), service(slot)),
            (1, Some(target)) => builder.alias(id(slot), target),
            (2, Some(target)) => builder.factory_fn(id(slot), move |c, _| c.get(&target)),
            (3, _) => builder.factory_fn(id(slot), |_, id| Ok(service(id.to_string()))),
            (4, Some(target)) => builder
                .factory_fn(id(slot), |_, _| Ok(service(0usize)))
                .extension_fn(id(slot), move |c, inner| {
                    c.get(&target)?;
                    Ok(inner)
                }),
            _ => builder,
        };
    }

    let container = builder.build();

    for byte in lookups {
        let key = id(*byte as usize);
        match container.get(&key) {
            Ok(first) => {
                assert!(container.has(&key));
                let second = container.get(&key).unwrap();
                assert!(Arc::ptr_eq(&first, &second));
            }
            Err(DiError::NotFound(_)) => {}
            Err(other) => panic!("unexpected error for {}: {}", key, other),
        }
    }
});
