//! Sprite building from the command line.
//!
//! Phases:
//! - **Config** - load `sprite.toml` (or defaults) and apply CLI overrides
//! - **Collect** - gather `.svg` files from the inputs
//! - **Compile** - normalize shapes and build every selected mode
//! - **Write** - write artifacts below the output directory

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use svg_sprite::{
    ModeConfig, SpriteConfig, Spriter, debug, log,
    mode::Artifact,
};

use super::Cli;

/// Build all selected sprites.
pub fn build_sprites(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;
    let modes = select_modes(&config, &cli.modes);
    let dest = config.dest_dir();

    let inputs = collect_inputs(&cli.inputs)?;
    if inputs.is_empty() {
        bail!("no SVG files found in the given inputs");
    }

    let mut spriter = Spriter::new(config).context("invalid shape configuration")?;
    for (name, path) in &inputs {
        let source =
            fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
        spriter.add(name.as_str(), source);
    }
    debug!("collect"; "{} SVG files", inputs.len());

    let output = spriter.compile(&modes)?;

    let mut written = 0;
    for artifact in output.artifacts() {
        write_artifact(&dest, artifact)?;
        written += 1;
    }

    let failed = output.failures().count();
    log!(
        "done";
        "{} files written to {}, {} shapes skipped",
        written,
        dest.display(),
        output.skipped.len()
    );
    if failed > 0 {
        bail!("{failed} of {} modes failed", output.modes.len());
    }
    Ok(())
}

/// Load the config file, falling back to defaults when the default file is absent.
fn load_config(cli: &Cli) -> Result<SpriteConfig> {
    let mut config = if cli.config.exists() {
        SpriteConfig::from_path(&cli.config)
            .with_context(|| format!("failed to load {}", cli.config.display()))?
    } else if cli.config == Path::new("sprite.toml") {
        debug!("config"; "no sprite.toml, using defaults");
        SpriteConfig::default()
    } else {
        bail!("config file not found: {}", cli.config.display());
    };

    if let Some(output) = &cli.output {
        config.dest = std::env::current_dir()
            .context("failed to get current directory")?
            .join(output);
    }
    if let Some(limit) = cli.limit {
        config.limit = limit;
    }
    Ok(config)
}

/// Modes requested on the command line, the configured ones, or `css`.
fn select_modes(config: &SpriteConfig, requested: &[String]) -> BTreeMap<String, ModeConfig> {
    if requested.is_empty() {
        if config.mode.is_empty() {
            return BTreeMap::from([("css".to_string(), ModeConfig::default())]);
        }
        return config.mode.clone();
    }

    requested
        .iter()
        .map(|name| {
            let mode = config.mode.get(name).cloned().unwrap_or_default();
            (name.clone(), mode)
        })
        .collect()
}

/// Shape names and paths of all `.svg` files, sorted by name.
///
/// Files are named by their file name; files found in a directory by their
/// path relative to that directory.
fn collect_inputs(inputs: &[PathBuf]) -> Result<Vec<(String, PathBuf)>> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            collect_recursive(&mut files, input, input);
        } else if input.is_file() {
            let name = input
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            files.push((name, input.clone()));
        } else {
            bail!("input not found: {}", input.display());
        }
    }
    files.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(files)
}

fn collect_recursive(files: &mut Vec<(String, PathBuf)>, dir: &Path, base: &Path) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_recursive(files, &path, base);
        } else if is_svg(&path) {
            let rel = path.strip_prefix(base).unwrap_or(&path);
            let name = rel
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            files.push((name, path));
        }
    }
}

fn is_svg(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("svg"))
}

fn write_artifact(dest: &Path, artifact: &Artifact) -> Result<()> {
    let path = dest.join(&artifact.path);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(&path, &artifact.contents)
        .with_context(|| format!("failed to write {}", path.display()))?;
    log!("write"; "{}", artifact.path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_collect_inputs() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("nav")).unwrap();
        fs::write(dir.path().join("home.svg"), "<svg/>").unwrap();
        fs::write(dir.path().join("nav/left.SVG"), "<svg/>").unwrap();
        fs::write(dir.path().join("readme.txt"), "").unwrap();

        let files = collect_inputs(&[dir.path().to_path_buf()]).unwrap();
        let names: Vec<_> = files.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, vec!["home.svg", "nav/left.SVG"]);
    }

    #[test]
    fn test_missing_input() {
        assert!(collect_inputs(&[PathBuf::from("/definitely/not/here.svg")]).is_err());
    }

    #[test]
    fn test_select_modes() {
        let mut config = SpriteConfig::default();
        assert_eq!(
            select_modes(&config, &[]).keys().collect::<Vec<_>>(),
            vec!["css"]
        );

        config.mode.insert("symbol".into(), ModeConfig::default());
        assert_eq!(
            select_modes(&config, &[]).keys().collect::<Vec<_>>(),
            vec!["symbol"]
        );

        let requested = select_modes(&config, &["stack".to_string()]);
        assert_eq!(requested.keys().collect::<Vec<_>>(), vec!["stack"]);
    }
}
