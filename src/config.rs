use crate::glyphs::GlyphSet;
use crate::search::{default_engines, SearchEngine};
use crate::wave::{WaveParams, WaveStyle};
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Settings {
    pub(crate) fps_cap: u32,
    pub(crate) wave: WaveParams,
    pub(crate) wave_style: WaveStyle,
    pub(crate) glyphs: GlyphSet,
    pub(crate) show_background: bool,
    pub(crate) enable_color: bool,
    pub(crate) engines: Vec<SearchEngine>,
    pub(crate) default_engine: usize,
    pub(crate) seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            fps_cap: 60,
            wave: WaveParams::default(),
            wave_style: WaveStyle::Bars,
            glyphs: GlyphSet::Adlam,
            show_background: true,
            enable_color: true,
            engines: default_engines(),
            default_engine: 0,
            seed: None,
        }
    }
}

pub(crate) fn settings_path() -> Result<PathBuf> {
    let proj = ProjectDirs::from("com", "wavestart", "Wavestart")
        .context("could not resolve project directories")?;
    let dir = proj.config_dir().to_path_buf();
    fs::create_dir_all(&dir).ok();
    Ok(dir.join("settings.json"))
}

/// Missing or broken files give the defaults; unknown fields are ignored and
/// absent ones take their default.
pub(crate) fn load_settings(path: &Path) -> Settings {
    if let Ok(s) = fs::read_to_string(path) {
        if let Ok(v) = serde_json::from_str::<Settings>(&s) {
            return v;
        }
    }
    Settings::default()
}

pub(crate) fn save_settings_atomic(path: &Path, s: &Settings) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).ok();
    }
    let tmp = path.with_extension("json.tmp");
    let data = serde_json::to_vec_pretty(s)?;
    fs::write(&tmp, data).with_context(|| format!("writing {}", tmp.display()))?;
    atomic_rename(&tmp, path)?;
    Ok(())
}

/// What goes back to disk on exit: the file's own values plus the engine
/// that was active at quit. Command-line overrides stay out of the file.
pub(crate) fn settings_on_exit(file: &Settings, active_engine: usize) -> Settings {
    Settings {
        default_engine: active_engine,
        ..file.clone()
    }
}

fn atomic_rename(from: &Path, to: &Path) -> Result<()> {
    // rename over an existing file fails on Windows
    if cfg!(windows) && to.exists() {
        let _ = fs::remove_file(to);
    }
    fs::rename(from, to).with_context(|| format!("replacing {}", to.display()))?;
    Ok(())
}
