#![no_main]

use keyed_di::{Container, ContainerConfig};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(source) = std::str::from_utf8(data) else {
        return;
    };

    // Malformed input must surface as an error, never a panic
    let Ok(config) = ContainerConfig::from_json(source) else {
        return;
    };

    let reparsed = ContainerConfig::from_json(&config.to_json().unwrap()).unwrap();
    assert_eq!(reparsed, config);

    // Unknown provider and resolver names are rejected; everything else builds. Lookups
    // are skipped: configured aliases may form cycles, which are not detected.
    if let Ok(builder) = Container::builder().configure(&config) {
        let container = builder.build();
        for id in config.aliases.keys().chain(config.factories.keys()) {
            assert!(container.has(id));
        }
    }
});
