// Build script to stage GLSL shaders next to the built binary
//
// The resource loader resolves assets relative to the executable, so the
// shader sources have to sit in target/<profile>/ for `cargo run` to work.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const SHADERS: [&str; 2] = ["shader.vert", "shader.frag"];

fn main() {
    println!("cargo:rerun-if-changed=shaders/");

    let Some(target_dir) = profile_dir() else {
        println!("cargo:warning=could not locate the target directory; shaders not staged");
        return;
    };

    for name in SHADERS {
        stage_shader(&Path::new("shaders").join(name), &target_dir.join(name));
    }
}

/// OUT_DIR is target/<profile>/build/<pkg>-<hash>/out, the binary lives in target/<profile>/
fn profile_dir() -> Option<PathBuf> {
    let out_dir = PathBuf::from(env::var_os("OUT_DIR")?);
    out_dir.ancestors().nth(3).map(Path::to_path_buf)
}

fn stage_shader(input: &Path, output: &Path) {
    match fs::copy(input, output) {
        Ok(_) => {}
        Err(e) => {
            println!(
                "cargo:warning=failed to stage {} -> {}: {}",
                input.display(),
                output.display(),
                e
            );
        }
    }
}
