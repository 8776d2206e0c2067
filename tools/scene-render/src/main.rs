// Render tinyraster scenes and compare renders.
//
// Usage:
//   scene-render render <scene> <width> <height> [-o <output.bmp>]
//   scene-render compare <file_a> <file_b>
//   scene-render list

use std::path::Path;
use std::process;

use scene_render::{compare_frames, load_bmp, save_bmp, scenes};

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let result = match args[1].as_str() {
        "render" => cmd_render(&args[2..]),
        "compare" => cmd_compare(&args[2..]),
        "list" => {
            cmd_list();
            Ok(())
        }
        _ => {
            eprintln!("Unknown command: {}", args[1]);
            print_usage();
            process::exit(1);
        }
    };

    if let Err(msg) = result {
        log::error!("{}", msg);
        eprintln!("{}", msg);
        process::exit(1);
    }
}

fn print_usage() {
    eprintln!("scene-render: render tinyraster scenes to BMP");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  render <scene> <width> <height> [-o <output.bmp>]");
    eprintln!("      Render a scene to a BMP file.");
    eprintln!();
    eprintln!("  compare <file_a> <file_b>");
    eprintln!("      Compare two BMP files pixel by pixel. Exits 1 when they differ.");
    eprintln!();
    eprintln!("  list");
    eprintln!("      List available scene names.");
}

fn cmd_list() {
    println!("Available scenes:");
    for name in scenes::available_scenes() {
        println!("  {}", name);
    }
}

fn parse_dim(s: &str, what: &str) -> Result<u32, String> {
    match s.parse::<u32>() {
        Ok(v) if v > 0 && v <= 8192 => Ok(v),
        _ => Err(format!("Invalid {}: '{}' (expected 1..=8192)", what, s)),
    }
}

fn cmd_render(args: &[String]) -> Result<(), String> {
    if args.len() < 3 {
        return Err("Usage: scene-render render <scene> <width> <height> [-o <output>]".into());
    }
    let scene = &args[0];
    let width = parse_dim(&args[1], "width")?;
    let height = parse_dim(&args[2], "height")?;

    let mut output: Option<String> = None;
    let mut i = 3;
    while i < args.len() {
        if args[i] == "-o" && i + 1 < args.len() {
            output = Some(args[i + 1].clone());
            i += 2;
        } else {
            log::warn!("ignoring argument '{}'", args[i]);
            i += 1;
        }
    }
    let output = output.unwrap_or_else(|| format!("{}_{}x{}.bmp", scene, width, height));

    println!("Rendering '{}' at {}x{}...", scene, width, height);
    let frame = scenes::render_scene(scene, width, height)
        .ok_or_else(|| format!("Unknown scene: '{}'. Use 'list' to see available scenes.", scene))?;
    save_bmp(Path::new(&output), &frame).map_err(|e| format!("Failed to save {}: {}", output, e))?;
    println!("Saved: {}", output);
    Ok(())
}

fn cmd_compare(args: &[String]) -> Result<(), String> {
    if args.len() < 2 {
        return Err("Usage: scene-render compare <file_a> <file_b>".into());
    }
    let a = load_bmp(Path::new(&args[0])).map_err(|e| format!("Failed to load {}: {}", args[0], e))?;
    let b = load_bmp(Path::new(&args[1])).map_err(|e| format!("Failed to load {}: {}", args[1], e))?;

    let cmp = compare_frames(&a, &b).ok_or_else(|| {
        format!(
            "Size mismatch: {}x{} vs {}x{}",
            a.width, a.height, b.width, b.height
        )
    })?;
    println!("{}", cmp);
    if !cmp.identical() {
        process::exit(1);
    }
    Ok(())
}
