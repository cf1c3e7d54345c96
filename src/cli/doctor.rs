//! Environment readiness check.

use crate::browser::chromium::find_chromium;
use crate::config::{Config, Overrides};
use anyhow::Result;
use std::process::Command;

/// Check configuration, Chromium availability, the publish directory, and
/// available memory.
pub async fn run() -> Result<()> {
    println!("Shorecast Doctor");
    println!("================");
    println!();

    let os = std::env::consts::OS;
    let arch = std::env::consts::ARCH;
    println!("OS:   {os}");
    println!("Arch: {arch}");
    println!();

    let config = match Config::resolve(Overrides::default()) {
        Ok(config) => {
            println!(
                "[OK] configuration resolves (zone {}, port {}, every {}s)",
                config.zone,
                config.port,
                config.interval.as_secs()
            );
            Some(config)
        }
        Err(e) => {
            println!("[!!] configuration error: {e:#}");
            None
        }
    };

    let chromium_path = find_chromium(config.as_ref().and_then(|c| c.chromium_path.as_deref()));
    match &chromium_path {
        Some(path) => println!("[OK] Chromium found: {}", path.display()),
        None => println!(
            "[!!] Chromium NOT found. Install Chrome/Chromium or set SHORECAST_CHROMIUM_PATH."
        ),
    }

    let mut dir_writable = false;
    if let Some(config) = &config {
        let probe = config.public_dir.join(".doctor-probe");
        let ok = std::fs::create_dir_all(&config.public_dir).is_ok()
            && std::fs::write(&probe, b"probe").is_ok();
        let _ = std::fs::remove_file(&probe);
        if ok {
            println!(
                "[OK] publish dir {} is writable",
                config.public_dir.display()
            );
            dir_writable = true;
        } else {
            println!(
                "[!!] publish dir {} is not writable",
                config.public_dir.display()
            );
        }
    }

    match get_available_memory_mb() {
        Some(mb) => {
            if mb >= 256 {
                println!("[OK] Available memory: {mb}MB (>= 256MB required)");
            } else {
                println!("[!!] Available memory: {mb}MB (< 256MB, may be insufficient)");
            }
        }
        None => println!("[??] Could not determine available memory"),
    }

    println!();
    if chromium_path.is_some() && dir_writable {
        println!("Status: READY");
    } else {
        println!("Status: NOT READY");
    }

    Ok(())
}

/// Get available memory in MB (platform-specific).
fn get_available_memory_mb() -> Option<u64> {
    #[cfg(target_os = "macos")]
    {
        let output = Command::new("sysctl")
            .args(["-n", "hw.memsize"])
            .output()
            .ok()?;
        let s = String::from_utf8_lossy(&output.stdout);
        let bytes: u64 = s.trim().parse().ok()?;
        Some(bytes / 1_048_576)
    }
    #[cfg(target_os = "linux")]
    {
        let output = Command::new("free").args(["-m"]).output().ok()?;
        let s = String::from_utf8_lossy(&output.stdout);
        for line in s.lines() {
            if line.starts_with("Mem:") {
                let parts: Vec<&str> = line.split_whitespace().collect();
                if parts.len() >= 7 {
                    return parts[6].parse().ok();
                }
            }
        }
        None
    }
    #[cfg(not(any(target_os = "macos", target_os = "linux")))]
    {
        None
    }
}
