use std::env;
use std::fs;
use std::path::Path;

fn main() {
    let out_dir = env::var("OUT_DIR").unwrap();
    println!("cargo:rustc-link-search=native={}", &out_dir);
    let out_dir: &Path = out_dir.as_ref();
    fs::copy("./src/memory.x", out_dir.join("memory.x"))
        .expect("Failed to copy memory layout linker script");
    println!("cargo:rerun-if-changed=src/memory.x");
}
