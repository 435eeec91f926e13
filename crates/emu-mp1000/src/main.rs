//! APF MP-1000 emulator binary.
//!
//! Runs headless for a number of frames and optionally saves a screenshot.

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use emu_core::Observable;
use emu_mp1000::{Mp1000, Mp1000Config, Mp1000Key, capture};

struct CliArgs {
    bios_path: Option<PathBuf>,
    basic_path: Option<PathBuf>,
    cart_path: Option<PathBuf>,
    frames: u32,
    screenshot_path: Option<PathBuf>,
    frames_dir: Option<PathBuf>,
    type_text: Option<String>,
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut cli = CliArgs {
        bios_path: None,
        basic_path: None,
        cart_path: None,
        frames: 200,
        screenshot_path: None,
        frames_dir: None,
        type_text: None,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--bios" => {
                i += 1;
                cli.bios_path = args.get(i).map(PathBuf::from);
            }
            "--basic" => {
                i += 1;
                cli.basic_path = args.get(i).map(PathBuf::from);
            }
            "--cart" => {
                i += 1;
                cli.cart_path = args.get(i).map(PathBuf::from);
            }
            "--frames" => {
                i += 1;
                if let Some(s) = args.get(i) {
                    cli.frames = s.parse().unwrap_or(200);
                }
            }
            "--screenshot" => {
                i += 1;
                cli.screenshot_path = args.get(i).map(PathBuf::from);
            }
            "--frames-dir" => {
                i += 1;
                cli.frames_dir = args.get(i).map(PathBuf::from);
            }
            "--type" => {
                i += 1;
                cli.type_text = args.get(i).cloned();
            }
            "--help" | "-h" => {
                eprintln!("Usage: emu-mp1000 --bios <file> [OPTIONS]");
                eprintln!();
                eprintln!("Options:");
                eprintln!("  --bios <file>        2 KB BIOS ROM (required)");
                eprintln!("  --basic <file>       8 KB Imagination Machine BASIC ROM");
                eprintln!("  --cart <file>        Cartridge ROM (2, 4 or 8 KB)");
                eprintln!("  --frames <n>         Number of frames to run [default: 200]");
                eprintln!("  --screenshot <file>  Save a PNG screenshot after the run");
                eprintln!("  --frames-dir <dir>   Save every frame as a numbered PNG");
                eprintln!("  --type <text>        Type text on the keyboard once the run is half done");
                process::exit(0);
            }
            other => {
                eprintln!("Unknown argument: {other}");
                process::exit(1);
            }
        }
        i += 1;
    }

    cli
}

fn read_file(path: &Path, what: &str) -> Vec<u8> {
    match fs::read(path) {
        Ok(data) => data,
        Err(e) => {
            eprintln!("Failed to read {what} {}: {e}", path.display());
            process::exit(1);
        }
    }
}

fn make_mp1000(cli: &CliArgs) -> Mp1000 {
    let Some(bios_path) = &cli.bios_path else {
        eprintln!("--bios <file> is required");
        process::exit(1);
    };
    let config = Mp1000Config {
        bios: read_file(bios_path, "BIOS"),
        basic: cli.basic_path.as_deref().map(|p| read_file(p, "BASIC ROM")),
        cartridge: cli.cart_path.as_deref().map(|p| read_file(p, "cartridge")),
    };
    match Mp1000::new(&config) {
        Ok(mp1000) => mp1000,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    }
}

/// Hold each character for three frames with a three-frame gap.
fn type_text(mp1000: &mut Mp1000, text: &str) {
    for ch in text.chars() {
        let Some(key) = Mp1000Key::from_char(ch) else {
            eprintln!("Skipping untypeable character {ch:?}");
            continue;
        };
        mp1000.key_down(key);
        for _ in 0..3 {
            mp1000.run_frame();
        }
        mp1000.key_up(key);
        for _ in 0..3 {
            mp1000.run_frame();
        }
    }
}

fn main() {
    let cli = parse_args();
    let mut mp1000 = make_mp1000(&cli);

    if let Some(dir) = &cli.frames_dir {
        if let Err(e) = capture::save_frame_sequence(&mut mp1000, dir, cli.frames) {
            eprintln!("Capture error: {e}");
            process::exit(1);
        }
        eprintln!("Saved {} frames to {}", cli.frames, dir.display());
    } else {
        let half = cli.frames / 2;
        for _ in 0..half {
            mp1000.run_frame();
        }
        if let Some(text) = &cli.type_text {
            type_text(&mut mp1000, text);
        }
        for _ in half..cli.frames {
            mp1000.run_frame();
        }
    }

    if let Some(path) = &cli.screenshot_path {
        if let Err(e) = capture::save_screenshot(&mp1000, path) {
            eprintln!("Screenshot error: {e}");
            process::exit(1);
        }
        eprintln!("Screenshot saved to {}", path.display());
    }

    for path in ["cpu.pc", "cpu.a", "cpu.b", "cpu.x", "cpu.sp", "cpu.cc", "ticks"] {
        if let Some(value) = mp1000.query(path) {
            eprintln!("{path} = {value}");
        }
    }
}
