//! Build script for storefront crate.
//!
//! Generates a content hash for main.css so the stylesheet can be served
//! under an immutable, cache-busting file name.

use std::env;
use std::fs;
use std::path::Path;

use sha2::{Digest, Sha256};

fn main() {
    hash_css();
}

/// Hash main.css and copy it to the derived directory with the hash in its
/// file name.
///
/// Sets `CSS_HASH` for use with `env!("CSS_HASH")`. Failures are reported as
/// cargo warnings and leave the hash empty.
fn hash_css() {
    let Ok(manifest_dir) = env::var("CARGO_MANIFEST_DIR") else {
        println!("cargo:warning=CARGO_MANIFEST_DIR is not set");
        println!("cargo:rustc-env=CSS_HASH=");
        return;
    };
    let css_path = Path::new(&manifest_dir).join("static/css/main.css");

    println!("cargo:rerun-if-changed={}", css_path.display());

    let content = match fs::read(&css_path) {
        Ok(content) => content,
        Err(e) => {
            println!("cargo:warning=Could not read main.css: {e}");
            println!("cargo:rustc-env=CSS_HASH=");
            return;
        }
    };

    // First 8 hex chars of SHA-256
    let hash = format!("{:x}", Sha256::digest(&content));
    let short_hash = hash.get(..8).unwrap_or(&hash);

    println!("cargo:rustc-env=CSS_HASH={short_hash}");

    let derived_dir = Path::new(&manifest_dir).join("static/css/derived");
    let derived_path = derived_dir.join(format!("main.{short_hash}.css"));
    if let Err(e) = fs::create_dir_all(&derived_dir).and_then(|()| fs::copy(&css_path, &derived_path))
    {
        println!("cargo:warning=Could not write derived CSS: {e}");
    }
}
