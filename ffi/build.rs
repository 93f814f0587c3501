//! Generate `include/movie_ffi.h` for C hosts. Header generation is best
//! effort: a cbindgen failure only emits a warning so the library still builds.

use std::env;
use std::path::PathBuf;

fn main() {
    println!("cargo:rerun-if-changed=src");

    let Ok(crate_dir) = env::var("CARGO_MANIFEST_DIR") else {
        return;
    };
    let out = PathBuf::from(&crate_dir).join("include").join("movie_ffi.h");

    let bindings = cbindgen::Builder::new()
        .with_crate(&crate_dir)
        .with_language(cbindgen::Language::C)
        .with_include_guard("MOVIE_FFI_H")
        .generate();

    match bindings {
        Ok(bindings) => {
            if let Some(dir) = out.parent() {
                if let Err(e) = std::fs::create_dir_all(dir) {
                    println!("cargo:warning=could not create {}: {e}", dir.display());
                    return;
                }
            }
            bindings.write_to_file(&out);
        }
        Err(e) => println!("cargo:warning=cbindgen failed: {e}"),
    }
}
