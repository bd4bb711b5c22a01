// build.rs

use chrono::Utc;
use std::env;
use std::fs;
use std::io;
use std::path::Path;

fn main() -> io::Result<()> {
    let out_dir = env::var("OUT_DIR").map_err(io::Error::other)?;
    let dest_path = Path::new(&out_dir).join("build_info.rs");

    let build_date = Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string();
    let profile = env::var("PROFILE").unwrap_or_else(|_| "unknown".into());

    // constants pulled into main.rs with include!
    fs::write(
        &dest_path,
        format!(
            "pub const BUILD_DATE: &str = \"{build_date}\";\n\
             pub const BUILD_PROFILE: &str = \"{profile}\";\n"
        ),
    )?;

    println!("cargo:rerun-if-changed=build.rs");
    Ok(())
}
