#![no_main]

use ldap_config_wire::ServerUrl;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok(url) = ServerUrl::parse(s) {
        assert!(!url.host.is_empty());
        // Display output must parse back to the same target
        let reparsed = ServerUrl::parse(&url.to_string()).expect("display output parses");
        assert_eq!(reparsed, url);
    }
});
