mod animator;
mod app;
mod clock;
mod config;
mod glyphs;
mod input;
mod render;
mod search;
mod wave;

use anyhow::{bail, Result};
use clap::Parser;
use config::{load_settings, save_settings_atomic, settings_path, Settings};
use glyphs::GlyphSet;
use wave::WaveStyle;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(about = "Terminal start page: clock, plucked wave line and a search bar")]
struct Args {
    /// frame cap (10..=240)
    #[arg(long)]
    fps: Option<u32>,

    /// rng seed for background glyphs and impulse placement
    #[arg(long)]
    seed: Option<u64>,

    /// search engine to start with, by name (case-insensitive)
    #[arg(long)]
    engine: Option<String>,

    /// background alphabet
    #[arg(long, value_parser = parse_glyphs)]
    glyphs: Option<GlyphSet>,

    /// wave line drawing: bars or letters
    #[arg(long, value_parser = parse_wave_style)]
    wave_style: Option<WaveStyle>,

    /// hide the glyph background
    #[arg(long)]
    no_background: bool,

    /// monochrome output
    #[arg(long)]
    no_color: bool,

    /// settings file (defaults to the per-user config dir)
    #[arg(long)]
    settings: Option<PathBuf>,

    /// write the effective settings to the settings file and exit
    #[arg(long)]
    write_settings: bool,
}

fn parse_glyphs(s: &str) -> Result<GlyphSet, String> {
    match s.to_ascii_lowercase().as_str() {
        "adlam" => Ok(GlyphSet::Adlam),
        "katakana" => Ok(GlyphSet::Katakana),
        "ascii" => Ok(GlyphSet::Ascii),
        other => Err(format!("unknown glyph set '{other}' (adlam, katakana, ascii)")),
    }
}

fn parse_wave_style(s: &str) -> Result<WaveStyle, String> {
    match s.to_ascii_lowercase().as_str() {
        "bars" => Ok(WaveStyle::Bars),
        "letters" => Ok(WaveStyle::Letters),
        other => Err(format!("unknown wave style '{other}' (bars, letters)")),
    }
}

fn apply_args(mut s: Settings, args: &Args) -> Result<Settings> {
    if let Some(fps) = args.fps {
        s.fps_cap = fps;
    }
    if args.seed.is_some() {
        s.seed = args.seed;
    }
    if let Some(g) = args.glyphs {
        s.glyphs = g;
    }
    if let Some(style) = args.wave_style {
        s.wave_style = style;
    }
    if args.no_background {
        s.show_background = false;
    }
    if args.no_color {
        s.enable_color = false;
    }
    if let Some(name) = &args.engine {
        let Some(i) = s
            .engines
            .iter()
            .position(|e| e.name.eq_ignore_ascii_case(name))
        else {
            let known: Vec<&str> = s.engines.iter().map(|e| e.name.as_str()).collect();
            bail!("no search engine named '{name}' (have: {})", known.join(", "));
        };
        s.default_engine = i;
    }
    Ok(s)
}

fn main() -> Result<()> {
    let args = Args::parse();
    let path = match &args.settings {
        Some(p) => p.clone(),
        None => settings_path()?,
    };
    let loaded = load_settings(&path);
    let settings = apply_args(loaded.clone(), &args)?;

    if args.write_settings {
        save_settings_atomic(&path, &settings)?;
        println!("{}", path.display());
        return Ok(());
    }

    app::run(settings, app::SettingsFile { path, loaded })
}
