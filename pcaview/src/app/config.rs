use app_core::string_error::ErrorStringExt;
use clap::Parser;
use std::{io::Read, path::PathBuf, time::Duration};

use super::common::{color_to_hex, parse_color};
use crate::state::color_groups::DEFAULT_MARKER_COLOR;

/// Command line arguments; they take precedence over the config file.
#[derive(Debug, Default, Parser)]
#[command(version, about = "Visualize principal component analyses")]
pub struct Args {
    /// Base URL of the PCA service.
    #[arg(long)]
    pub backend_url: Option<String>,
    /// Load the dataset stored on the service under this ID.
    #[arg(long = "config", value_name = "ID")]
    pub dataset_id: Option<String>,
    /// Load a CSV file at start.
    #[arg(long)]
    pub file: Option<PathBuf>,
}

#[derive(Debug)]
pub struct Config {
    pub backend_url: String,
    pub timeout_secs: u64,
    pub default_color: String,
    pub dataset_id: Option<String>,
    pub start_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:7000".to_string(),
            timeout_secs: 30,
            default_color: DEFAULT_MARKER_COLOR.to_string(),
            dataset_id: None,
            start_file: None,
        }
    }
}

impl Config {
    pub fn from_config_file() -> Result<Self, String> {
        #[allow(deprecated)]
        let Some(home) = std::env::home_dir() else {
            return Err("could not determine home directory to load config file".into());
        };
        let config_raw = {
            let path = home.join(PathBuf::from(".pcaview"));
            let mut file = std::fs::File::open(path).err_to_string("could not open config file")?;
            let mut buf = String::new();
            file.read_to_string(&mut buf)
                .err_to_string("could not load config file")?;
            buf
        };
        Ok(Self::from_config_str(&config_raw))
    }

    pub fn from_config_str(config_raw: &str) -> Self {
        let mut config = Self::default();
        for line in config_raw.lines() {
            // Lines starting with "#" are considered comments.
            if line.trim_start().starts_with('#') {
                continue;
            }
            let Some((key, val)) = line.split_once('=') else {
                continue;
            };
            match (key.trim(), val.trim()) {
                ("backend_url", url) => {
                    config.backend_url = url.to_string();
                }
                ("timeout_secs", secs_str) => {
                    if let Ok(secs) = secs_str.parse::<u64>() {
                        config.timeout_secs = secs;
                    } else {
                        log::warn!("could not parse 'timeout_secs' as number")
                    }
                }
                ("default_color", color) => {
                    if parse_color(color).is_some() {
                        config.default_color = color.to_string();
                    } else {
                        log::warn!("could not parse 'default_color' as color")
                    }
                }
                (key, _) => log::debug!("ignoring unknown config key '{}'", key),
            }
        }
        config
    }

    pub fn apply_args(&mut self, args: Args) {
        if let Some(url) = args.backend_url {
            self.backend_url = url;
        }
        if args.dataset_id.is_some() {
            self.dataset_id = args.dataset_id;
        }
        if args.file.is_some() {
            self.start_file = args.file;
        }
    }

    /// Request timeout; zero disables it.
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }

    /// Renders the preferences view. Returns true once the connection
    /// settings should be applied.
    pub fn render(&mut self, ui: &mut egui::Ui) -> bool {
        let mut apply = false;
        ui.heading("Preferences");
        ui.separator();
        egui::Grid::new("preferences_grid")
            .num_columns(2)
            .spacing([20.0, 8.0])
            .show(ui, |ui| {
                ui.label("PCA service URL");
                ui.text_edit_singleline(&mut self.backend_url);
                ui.end_row();

                ui.label("Request timeout");
                ui.add(
                    egui::DragValue::new(&mut self.timeout_secs)
                        .range(0..=600)
                        .suffix(" s"),
                );
                ui.end_row();

                ui.label("Default marker color");
                let mut color = parse_color(&self.default_color).unwrap_or_default();
                if ui.color_edit_button_srgba(&mut color).changed() {
                    self.default_color = color_to_hex(color);
                }
                ui.end_row();
            });
        ui.add_space(8.0);
        if ui.button("Apply connection settings").clicked() {
            apply = true;
        }
        apply
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_str() {
        let _ = env_logger::builder().is_test(true).try_init();
        let config = Config::from_config_str(
            "# PCA service\nbackend_url = http://pca.local:8080\ntimeout_secs=0\n\
             default_color=nonsense\nunknown=1\n",
        );
        assert_eq!(config.backend_url, "http://pca.local:8080");
        assert_eq!(config.timeout(), None);
        assert_eq!(config.default_color, DEFAULT_MARKER_COLOR);
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.backend_url, "http://localhost:7000");
        assert_eq!(config.timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_args_override_file() {
        let args = Args::try_parse_from([
            "pcaview",
            "--backend-url",
            "http://remote:7000",
            "--config",
            "demo",
        ])
        .unwrap();
        let mut config = Config::from_config_str("backend_url=http://local:7000\n");
        config.apply_args(args);
        assert_eq!(config.backend_url, "http://remote:7000");
        assert_eq!(config.dataset_id.as_deref(), Some("demo"));
        assert_eq!(config.start_file, None);
    }
}
