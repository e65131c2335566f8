use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug, PartialEq)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Resource directory (overrides `resource_dir` in the settings file)
    #[arg(long)]
    pub resources: Option<PathBuf>,

    /// Settings file; `<file>.template` is used when it does not exist
    #[arg(long, default_value = "editor_settings.json")]
    pub settings: PathBuf,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// Render feature layers to PNG.
    Render {
        /// Output directory; one `<layer>.png` per layer.
        #[arg(long, default_value = "render")]
        out: PathBuf,
        /// Render only this layer (e.g. climate, low_wheat).
        #[arg(long)]
        layer: Option<String>,
    },

    /// Show a region and its value on every layer.
    ///
    /// Example: `inspect --x 10 --y 20` or `inspect --name svea`
    Inspect {
        #[arg(
            long,
            requires = "y",
            required_unless_present = "name",
            allow_negative_numbers = true
        )]
        x: Option<i64>,
        #[arg(long, requires = "x", allow_negative_numbers = true)]
        y: Option<i64>,
        /// First region whose state name starts with this (any case).
        #[arg(long, conflicts_with_all = ["x", "y"])]
        name: Option<String>,
    },

    /// Paint a label onto the regions under the given pixels.
    ///
    /// Example: `paint --layer climate --label Cfa --at 10,20 --at 30,40`
    Paint {
        #[arg(long)]
        layer: String,
        #[arg(long)]
        label: String,
        /// Pixel as `x,y`; repeatable.
        #[arg(
            long = "at",
            value_parser = parse_point,
            required = true,
            allow_hyphen_values = true
        )]
        points: Vec<(i64, i64)>,
        /// Export the registry and history afterwards.
        #[arg(long)]
        export: bool,
    },

    /// Replay a saved `project_state.json` onto the loaded registry.
    Replay {
        #[arg(long)]
        project: PathBuf,
        /// Also render the replayed layers here.
        #[arg(long)]
        out: Option<PathBuf>,
        /// Export the registry and history afterwards.
        #[arg(long)]
        export: bool,
    },

    /// Export the registry as loaded.
    Export,
}

fn parse_point(text: &str) -> Result<(i64, i64), String> {
    let (x, y) = text
        .split_once(',')
        .ok_or_else(|| format!("expected x,y but got '{}'", text))?;
    let coord = |v: &str| {
        v.trim()
            .parse::<i64>()
            .map_err(|e| format!("bad coordinate '{}': {}", v, e))
    };
    Ok((coord(x)?, coord(y)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_paint() {
        let cli = Cli::parse_from([
            "v3edit", "paint", "--layer", "climate", "--label", "Cfa", "--at", "1,2", "--at",
            "-3, 4",
        ]);
        assert_eq!(
            cli.command,
            Commands::Paint {
                layer: "climate".into(),
                label: "Cfa".into(),
                points: vec![(1, 2), (-3, 4)],
                export: false,
            }
        );
        assert_eq!(cli.settings, PathBuf::from("editor_settings.json"));
    }

    #[test]
    fn test_parse_inspect_targets() {
        let by_name = Cli::parse_from(["v3edit", "inspect", "--name", "svea"]);
        assert_eq!(
            by_name.command,
            Commands::Inspect {
                x: None,
                y: None,
                name: Some("svea".into()),
            }
        );
        assert!(Cli::try_parse_from(["v3edit", "inspect"]).is_err());
        assert!(Cli::try_parse_from(["v3edit", "inspect", "--x", "1"]).is_err());
        assert!(
            Cli::try_parse_from(["v3edit", "inspect", "--x", "1", "--y", "2", "--name", "a"])
                .is_err()
        );
    }

    #[test]
    fn test_parse_point_rejects_garbage() {
        assert!(parse_point("12").is_err());
        assert!(parse_point("a,b").is_err());
    }
}
