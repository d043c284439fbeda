fn main() {
    // Build-time identity and credentials (see `config::SystemConfig::from_build_env`).
    for var in [
        "SHOCKSHADOW_THING_NAME",
        "SHOCKSHADOW_ENDPOINT",
        "SHOCKSHADOW_WIFI_SSID",
        "SHOCKSHADOW_WIFI_PASSWORD",
    ] {
        println!("cargo:rerun-if-env-changed={var}");
    }

    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
