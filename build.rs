fn main() {
    println!("cargo:rerun-if-env-changed=KVM_WIFI_SSID");
    println!("cargo:rerun-if-env-changed=KVM_WIFI_PASSWORD");
    println!("cargo:rerun-if-env-changed=KVM_CONFIG_JSON");

    // Host builds (tests, fuzzing) have no ESP-IDF toolchain to export.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
