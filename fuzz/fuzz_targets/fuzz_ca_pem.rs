#![no_main]

use ldap_config_wire::TlsConfig;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(pem) = std::str::from_utf8(data) else {
        return;
    };

    // Must never panic; garbage is InvalidTlsMaterial
    let _ = TlsConfig::builder("ldap.example.org")
        .ca_certificate_pem(pem)
        .build();
});
