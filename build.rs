const LOCAL_ENV: &str = "roomsense.local.env";

const KEYS: &[&str] = &[
    "WIFI_SSID",
    "WIFI_PASS",
    "TIME_SERVER_URL",
    "INFLUX_URL",
    "INFLUX_ORG",
    "INFLUX_BUCKET",
    "INFLUX_TOKEN",
    "SENSOR_HOST",
    "SENSOR_ROOM",
    "ROOMSENSE_UNIT",
    "ROOMSENSE_COUPLE_FOOTER",
    "ROOMSENSE_UPDATE_SECS",
    "ROOMSENSE_TICK_MS",
    "ROOMSENSE_DEBOUNCE_MS",
    "ROOMSENSE_SENDING_DEBOUNCE_MS",
    "ROOMSENSE_ACCEPT_MS",
    "ROOMSENSE_NET_TIMEOUT_MS",
];

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed={}", LOCAL_ENV);
    for key in KEYS {
        println!("cargo:rerun-if-env-changed={}", key);
    }
    emit_local_env();

    if std::env::var("CARGO_CFG_TARGET_ARCH").as_deref() == Ok("xtensa") {
        println!("cargo:rustc-link-arg-bins=-Tlinkall.x");
    }
}

// Values already set in the build environment win over the file.
fn emit_local_env() {
    let Ok(src) = std::fs::read_to_string(LOCAL_ENV) else {
        return;
    };

    for line in src.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let Some((key, value)) = trimmed.split_once('=') else {
            continue;
        };
        let key = key.trim();
        if !KEYS.contains(&key) || std::env::var_os(key).is_some() {
            continue;
        }
        let value = value.trim().trim_matches('"');
        println!("cargo:rustc-env={}={}", key, value);
    }
}
