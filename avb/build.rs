//! Build script for morpheus-avb.
//!
//! Places the verified boot trust anchor into OUT_DIR so the library can embed
//! it with `include_bytes!`. Override the key with MORPHEUS_AVB_PK.

use std::env;
use std::fs;
use std::path::PathBuf;

const DEFAULT_KEY: &str = "keys/avb_pk.bin";

fn main() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").expect("OUT_DIR not set"));

    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=MORPHEUS_AVB_PK");

    let key_path = match env::var("MORPHEUS_AVB_PK") {
        Ok(path) if !path.is_empty() => PathBuf::from(path),
        _ => PathBuf::from(DEFAULT_KEY),
    };
    println!("cargo:rerun-if-changed={}", key_path.display());

    let key = fs::read(&key_path)
        .unwrap_or_else(|e| panic!("failed to read trust anchor {}: {}", key_path.display(), e));

    if key.is_empty() {
        panic!("trust anchor {} is empty", key_path.display());
    }

    if key_path != PathBuf::from(DEFAULT_KEY) {
        println!(
            "cargo:warning=Embedding AVB public key from {} ({} bytes)",
            key_path.display(),
            key.len()
        );
    }

    fs::write(out_dir.join("avb_pk.bin"), &key).expect("failed to write avb_pk.bin");
}
