use std::env;
use std::path::{Path, PathBuf};

const WATCHED_VARIABLES: [&str; 4] = ["FFMPEG_DIR", "VCPKG_ROOT", "VCPKGRS_DYNAMIC", "VCPKGRS_TRIPLET"];
const DEFAULT_TRIPLET: &str = "x64-windows";

fn warn(message: impl AsRef<str>) {
    println!("cargo:warning={}", message.as_ref());
}

fn vcpkg_ffmpeg_dir(root: &str) -> PathBuf {
    let triplet = env::var("VCPKGRS_TRIPLET").unwrap_or_else(|_| DEFAULT_TRIPLET.to_string());
    Path::new(root).join("installed").join(triplet)
}

fn main() {
    for variable in WATCHED_VARIABLES {
        println!("cargo:rerun-if-env-changed={variable}");
    }

    // Linux and macOS find FFmpeg through pkg-config.
    if env::var("CARGO_CFG_TARGET_OS").as_deref() != Ok("windows")
        || env::var_os("FFMPEG_DIR").is_some()
    {
        return;
    }

    let Ok(root) = env::var("VCPKG_ROOT") else {
        warn("vidgif needs FFmpeg. Install it with vcpkg and set FFMPEG_DIR (or VCPKG_ROOT).");
        return;
    };

    let ffmpeg_dir = vcpkg_ffmpeg_dir(&root);
    if !ffmpeg_dir.exists() {
        warn(format!("no vcpkg FFmpeg install under {}", ffmpeg_dir.display()));
        return;
    }

    warn(format!(
        "using vcpkg FFmpeg at {0}; set FFMPEG_DIR={0} to skip discovery",
        ffmpeg_dir.display()
    ));
    if env::var_os("VCPKGRS_DYNAMIC").is_none() {
        warn("dynamic vcpkg FFmpeg builds also need VCPKGRS_DYNAMIC=1");
    }
}
