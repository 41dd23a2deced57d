use std::env;
use std::fs;
use std::io;
use std::path::Path;

fn get_platform() -> Option<String> {
    let features = env::vars().filter(|&(ref key, _)| key.starts_with("CARGO_FEATURE_MCU"));
    features.last().map(|(feature_var, _)| {
        feature_var
            .trim_start_matches("CARGO_FEATURE_MCU_")
            .to_string()
            .to_ascii_lowercase()
    })
}

/// Places `<platform>_vectors.x` where the board's `memory.x` can `INCLUDE` it.
fn copy_linker_scripts<P: AsRef<Path>, Q: AsRef<Path>>(platform: P, out_path: Q) -> io::Result<()> {
    let platform = platform.as_ref();
    let source = Path::new("src/hal").join(platform).join("vectors.x");
    let target = out_path.as_ref().join(format!("{}_vectors.x", platform.display()));
    println!("cargo:rerun-if-changed={}", source.display());
    fs::copy(source, target)?;
    Ok(())
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    let platform = match get_platform() {
        Some(p) => p,
        None => {
            return;
        },
    };
    // Get output directory for cargo for rtboot crate
    let out_dir = env::var("OUT_DIR").unwrap();

    // Move linker scripts to cargo output dir
    copy_linker_scripts(&platform, &out_dir)
        .expect("Failed to copy linker scripts");

    // Make sure that the output dir is passed to linker
    println!("cargo:rustc-link-search=native={}", out_dir);
}
