//! Regenerates `include/sluice.h` from the exported `extern "C"` surface.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const HEADER: &str = "include/sluice.h";

fn main() {
    let manifest_dir = match env::var_os("CARGO_MANIFEST_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => panic!("CARGO_MANIFEST_DIR is not set; run through cargo"),
    };

    for watched in ["src", "cbindgen.toml", "build.rs"] {
        println!("cargo:rerun-if-changed={watched}");
    }

    let config_path = manifest_dir.join("cbindgen.toml");
    let config = match cbindgen::Config::from_file(&config_path) {
        Ok(config) => config,
        Err(e) => panic!("reading {}: {e}", config_path.display()),
    };

    let header = manifest_dir.join(HEADER);
    ensure_parent(&header);

    match cbindgen::generate_with_config(&manifest_dir, config) {
        Ok(bindings) => {
            // Only rewrites the file when the declarations changed.
            bindings.write_to_file(&header);
        }
        Err(e) => panic!("generating {HEADER}: {e}"),
    }
}

fn ensure_parent(path: &Path) {
    if let Some(dir) = path.parent() {
        if let Err(e) = fs::create_dir_all(dir) {
            panic!("creating {}: {e}", dir.display());
        }
    }
}
