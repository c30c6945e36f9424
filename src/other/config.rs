use std::{
    ffi::OsStr,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
    time::Duration,
};

use anchortip::{
    config::{
        ArrowTracking, BorderJoin, Easing, NudgeConfig, TooltipConfig,
        Transition,
    },
    geometry::Insets,
    side::Side,
};
use directories::ProjectDirs;
use iced::{Color, Padding, Size};
use knuffel::{Decode, ast::Literal, errors::DecodeError};
use miette::{Context, IntoDiagnostic, miette};
use rustc_hash::FxHashMap;
use tracing::{debug, error, info};

use crate::{file_watcher::ConfigPath, other::constants::APP_NAMESPACE};

#[derive(knuffel::Decode, Default, Debug)]
pub struct RawConfig {
    #[knuffel(child, default)]
    pub tooltip: RawTooltip,
    #[knuffel(child, default)]
    pub window: RawWindow,
    #[knuffel(child, default)]
    pub anchors: RawAnchors,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub tooltip: TooltipConfig,
    pub window: Window,
    pub anchors: Vec<Anchor>,
}

impl Default for Config {
    fn default() -> Self {
        RawConfig::default().hydrate(&ColorVars::default())
    }
}

impl RawConfig {
    pub fn hydrate(self, colors: &ColorVars) -> Config {
        let tooltip = self.tooltip.hydrate(colors);
        let anchors = self.anchors.hydrate(&tooltip);
        Config {
            tooltip,
            window: self.window.hydrate(),
            anchors,
        }
    }
}

/// Settings shared by every tooltip. Anything left out keeps the library
/// default.
#[derive(knuffel::Decode, Default, Debug)]
pub struct RawTooltip {
    #[knuffel(child, unwrap(argument))]
    side: Option<Side>,
    #[knuffel(child, unwrap(argument))]
    margin: Option<f32>,
    #[knuffel(child, unwrap(argument))]
    arrow_width: Option<f32>,
    #[knuffel(child, unwrap(argument))]
    arrow_height: Option<f32>,
    #[knuffel(child, unwrap(argument))]
    show_arrow: Option<bool>,
    #[knuffel(child, unwrap(argument))]
    border_width: Option<f32>,
    #[knuffel(child, unwrap(argument))]
    border_radius: Option<f32>,
    #[knuffel(child, unwrap(argument))]
    width: Option<f32>,
    #[knuffel(child, unwrap(argument))]
    height: Option<f32>,
    #[knuffel(child)]
    padding: Option<RawPadding>,
    #[knuffel(child, unwrap(argument))]
    background: Option<ConfigColor>,
    #[knuffel(child, unwrap(argument))]
    border_color: Option<ConfigColor>,
    #[knuffel(child, unwrap(argument))]
    text_color: Option<ConfigColor>,
    #[knuffel(child, unwrap(argument))]
    z_index: Option<f32>,
    #[knuffel(child, unwrap(argument))]
    transition: Option<Transition>,
    #[knuffel(child, unwrap(argument))]
    border_join: Option<BorderJoin>,
    #[knuffel(child)]
    tracking: Option<RawTracking>,
    #[knuffel(child)]
    animation: Option<RawAnimation>,
}

impl RawTooltip {
    fn hydrate(self, colors: &ColorVars) -> TooltipConfig {
        let defaults = TooltipConfig::default();
        TooltipConfig {
            side: self.side.unwrap_or(defaults.side),
            margin: self.margin.unwrap_or(defaults.margin),
            arrow_width: self.arrow_width.unwrap_or(defaults.arrow_width),
            arrow_height: self.arrow_height.unwrap_or(defaults.arrow_height),
            show_arrow: self.show_arrow.unwrap_or(defaults.show_arrow),
            border_width: self.border_width.unwrap_or(defaults.border_width),
            border_radius: self
                .border_radius
                .unwrap_or(defaults.border_radius),
            width: self.width,
            height: self.height,
            padding: self.padding.map_or(defaults.padding, Into::into),
            background: self
                .background
                .map_or(defaults.background, |c| c.resolve(colors)),
            border_color: self
                .border_color
                .map_or(defaults.border_color, |c| c.resolve(colors)),
            text_color: self.text_color.map(|c| c.resolve(colors)),
            animation: self.animation.map_or(defaults.animation, Into::into),
            z_index: self.z_index.unwrap_or(defaults.z_index),
            transition: self.transition.unwrap_or(defaults.transition),
            tracking: self.tracking.map_or(defaults.tracking, Into::into),
            border_join: self.border_join.unwrap_or(defaults.border_join),
        }
    }
}

#[derive(knuffel::Decode, Debug, Clone, Copy)]
pub struct RawPadding {
    #[knuffel(child, unwrap(argument), default = 4.0)]
    top: f32,
    #[knuffel(child, unwrap(argument), default = 8.0)]
    right: f32,
    #[knuffel(child, unwrap(argument), default = 4.0)]
    bottom: f32,
    #[knuffel(child, unwrap(argument), default = 8.0)]
    left: f32,
}

impl From<RawPadding> for Padding {
    fn from(raw: RawPadding) -> Self {
        Padding {
            top: raw.top,
            right: raw.right,
            bottom: raw.bottom,
            left: raw.left,
        }
    }
}

#[derive(knuffel::Decode, Debug, Clone, Copy)]
pub struct RawTracking {
    #[knuffel(child, unwrap(argument), default = 0.25)]
    horizontal: f32,
    #[knuffel(child, unwrap(argument), default = 0.0)]
    vertical: f32,
}

impl From<RawTracking> for ArrowTracking {
    fn from(raw: RawTracking) -> Self {
        ArrowTracking {
            horizontal: raw.horizontal,
            vertical: raw.vertical,
        }
    }
}

#[derive(knuffel::Decode, Debug, Clone, Copy)]
pub struct RawAnimation {
    #[knuffel(child, unwrap(argument), default = false)]
    enabled: bool,
    #[knuffel(child, unwrap(argument), default = 10.0)]
    offset: f32,
    #[knuffel(child, unwrap(argument), default = 1000)]
    period_ms: u64,
    #[knuffel(child, unwrap(argument), default)]
    easing: Easing,
}

impl From<RawAnimation> for NudgeConfig {
    fn from(raw: RawAnimation) -> Self {
        NudgeConfig {
            enabled: raw.enabled,
            offset: raw.offset,
            period: Duration::from_millis(raw.period_ms),
            easing: raw.easing,
        }
    }
}

#[derive(knuffel::Decode, Debug)]
pub struct RawWindow {
    #[knuffel(child, unwrap(argument), default = 900.0)]
    width: f32,
    #[knuffel(child, unwrap(argument), default = 700.0)]
    height: f32,
    #[knuffel(child)]
    safe_area: Option<RawInsets>,
}

impl Default for RawWindow {
    fn default() -> Self {
        Self {
            width: 900.0,
            height: 700.0,
            safe_area: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Window {
    pub size: Size,
    pub safe_area: Insets,
}

impl RawWindow {
    fn hydrate(self) -> Window {
        Window {
            size: Size::new(self.width, self.height),
            safe_area: self.safe_area.map_or(Insets::ZERO, Into::into),
        }
    }
}

#[derive(knuffel::Decode, Debug, Clone, Copy)]
pub struct RawInsets {
    #[knuffel(child, unwrap(argument), default)]
    top: f32,
    #[knuffel(child, unwrap(argument), default)]
    right: f32,
    #[knuffel(child, unwrap(argument), default)]
    bottom: f32,
    #[knuffel(child, unwrap(argument), default)]
    left: f32,
}

impl From<RawInsets> for Insets {
    fn from(raw: RawInsets) -> Self {
        Insets {
            top: raw.top,
            right: raw.right,
            bottom: raw.bottom,
            left: raw.left,
        }
    }
}

#[derive(knuffel::Decode, Default, Debug)]
pub struct RawAnchors {
    #[knuffel(children(name = "anchor"))]
    anchors: Vec<RawAnchor>,
}

#[derive(knuffel::Decode, Debug)]
pub struct RawAnchor {
    #[knuffel(argument)]
    label: String,
    #[knuffel(property, default)]
    side: Side,
    #[knuffel(property)]
    text: Option<String>,
    #[knuffel(property)]
    z_index: Option<f32>,
}

/// One anchor of the demo grid.
#[derive(Debug, Clone)]
pub struct Anchor {
    pub label: String,
    pub text: String,
    pub tooltip: TooltipConfig,
}

fn default_text(side: Side) -> String {
    format!("Tooltip on the {side} side")
}

impl RawAnchors {
    /// Without configured anchors the grid gets one anchor per side.
    fn hydrate(self, base: &TooltipConfig) -> Vec<Anchor> {
        if self.anchors.is_empty() {
            return Side::ALL
                .into_iter()
                .map(|side| Anchor {
                    label: side.name().to_string(),
                    text: default_text(side),
                    tooltip: base.clone().side(side),
                })
                .collect();
        }

        self.anchors
            .into_iter()
            .map(|raw| Anchor {
                text: raw.text.unwrap_or_else(|| default_text(raw.side)),
                tooltip: base
                    .clone()
                    .side(raw.side)
                    .z_index(raw.z_index.unwrap_or(base.z_index)),
                label: raw.label,
            })
            .collect()
    }
}

#[derive(knuffel::Decode, Debug)]
struct ColorVariable {
    #[knuffel(node_name)]
    pub name: String,
    #[knuffel(argument)]
    pub color: ConfigColor,
}

#[derive(Debug, Default, Clone)]
pub struct ColorVars {
    vars: FxHashMap<String, Color>,
}

impl<S> knuffel::DecodeChildren<S> for ColorVars
where
    S: knuffel::traits::ErrorSpan,
{
    fn decode_children(
        nodes: &[knuffel::ast::SpannedNode<S>],
        ctx: &mut knuffel::decode::Context<S>,
    ) -> Result<Self, DecodeError<S>> {
        let mut vars = FxHashMap::default();
        for node in nodes {
            let var = ColorVariable::decode_node(node, ctx)?;
            vars.insert(var.name, var.color.parse());
        }

        Ok(Self { vars })
    }
}

impl ColorVars {
    pub fn load(path: &Path) -> miette::Result<Self> {
        let contents = fs::read_to_string(path)
            .into_diagnostic()
            .with_context(|| format!("error reading {}", path.display()))?;

        Self::parse(
            path.file_name()
                .and_then(OsStr::to_str)
                .unwrap_or("colors.kdl"),
            &contents,
        )
    }

    /// A missing colors file is not an error, it just defines nothing.
    pub fn load_if_present(path: &Path) -> miette::Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn get(&self, name: &str) -> Option<Color> {
        let name = name.strip_prefix('$').unwrap_or(name);
        self.vars.get(name).copied()
    }

    pub fn parse(filename: &str, text: &str) -> miette::Result<Self> {
        match knuffel::parse::<ColorVars>(filename, text) {
            Ok(colors) => {
                debug!("parsed {} color variables", colors.vars.len());
                Ok(colors)
            }
            Err(e) => Err(miette::Report::new(e)),
        }
    }
}

pub fn config_dir(dir: Option<PathBuf>) -> miette::Result<PathBuf> {
    if let Some(dir) = dir {
        return Ok(dir);
    }
    let project_dir = ProjectDirs::from("", "", APP_NAMESPACE)
        .ok_or_else(|| miette!("could not determine the config directory"))?;
    Ok(project_dir.config_dir().to_path_buf())
}

impl ConfigPath {
    pub fn new(config_dir: &Path) -> Self {
        Self {
            config: config_dir.join("config.kdl"),
            colors: config_dir.join("colors.kdl"),
        }
    }
}

#[profiling::all_functions]
impl RawConfig {
    pub fn load(path: &Path) -> miette::Result<Self> {
        let contents = fs::read_to_string(path)
            .into_diagnostic()
            .with_context(|| format!("error reading {}", path.display()))?;

        Self::parse(
            path.file_name()
                .and_then(OsStr::to_str)
                .unwrap_or("config.kdl"),
            &contents,
        )
    }

    pub fn parse(filename: &str, text: &str) -> miette::Result<Self> {
        match knuffel::parse::<RawConfig>(filename, text) {
            Ok(config) => {
                info!("parsed config {filename}");
                Ok(config)
            }
            Err(e) => Err(miette::Report::new(e)),
        }
    }

    pub fn create(path: &Path) -> miette::Result<()> {
        if let Some(default_parent) = path.parent() {
            fs::create_dir_all(default_parent)
                .into_diagnostic()
                .with_context(|| {
                    format!(
                        "error creating config directory {}",
                        default_parent.display()
                    )
                })?;
        }

        let mut new_file = match File::options()
            .read(true)
            .write(true)
            .create_new(true)
            .open(path)
        {
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                return Ok(());
            }
            res => res,
        }
        .into_diagnostic()
        .with_context(|| {
            format!("error opening config file at {}", path.display())
        })?;

        let default_config = include_bytes!("../../assets/default-config.kdl");

        new_file
            .write_all(default_config)
            .into_diagnostic()
            .with_context(|| {
                format!("error writing default config to {}", path.display())
            })?;

        info!("wrote default config to {}", path.display());
        Ok(())
    }

    pub fn load_or_create(path: &Path) -> miette::Result<Self> {
        RawConfig::create(path)?;
        RawConfig::load(path)
    }

    /// Loads colors and config from `dir`. Broken files are logged and
    /// replaced by defaults; only an unresolvable directory is an error.
    pub fn init(
        dir: Option<PathBuf>,
    ) -> miette::Result<(Config, ColorVars, ConfigPath)> {
        let path = ConfigPath::new(&config_dir(dir)?);

        let colors = ColorVars::load_if_present(&path.colors)
            .unwrap_or_else(|e| {
                error!("failed to parse colors file");
                error!("{e:?}");
                ColorVars::default()
            });

        let raw_config =
            RawConfig::load_or_create(&path.config).unwrap_or_else(|e| {
                error!("failed to parse config file, using default config");
                error!("{e:?}");
                RawConfig::default()
            });

        Ok((raw_config.hydrate(&colors), colors, path))
    }

    pub fn validate(dir: Option<PathBuf>) -> miette::Result<()> {
        let path = ConfigPath::new(&config_dir(dir)?);
        ColorVars::load_if_present(&path.colors)?;
        RawConfig::load(&path.config)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigColor {
    Literal(Color),
    Variable(String),
}

impl ConfigColor {
    pub fn resolve(&self, colors: &ColorVars) -> Color {
        match self {
            ConfigColor::Literal(c) => *c,
            ConfigColor::Variable(name) => {
                colors.get(name).unwrap_or_else(|| {
                    error!(
                        "color variable '{}' not found, using red as default",
                        name
                    );
                    Color::from_rgb(1.0, 0.0, 0.0)
                })
            }
        }
    }

    /// Colors file entries cannot refer to other variables.
    pub fn parse(&self) -> Color {
        self.resolve(&ColorVars::default())
    }
}

impl<S> knuffel::DecodeScalar<S> for ConfigColor
where
    S: knuffel::traits::ErrorSpan,
{
    fn type_check(
        type_name: &Option<knuffel::span::Spanned<knuffel::ast::TypeName, S>>,
        ctx: &mut knuffel::decode::Context<S>,
    ) {
        if let Some(type_name) = &type_name {
            ctx.emit_error(DecodeError::unexpected(
                type_name,
                "type name",
                "no type name expected for this node",
            ));
        }
    }

    fn raw_decode(
        value: &knuffel::span::Spanned<Literal, S>,
        _ctx: &mut knuffel::decode::Context<S>,
    ) -> Result<Self, DecodeError<S>> {
        match **value {
            Literal::String(ref s) => {
                if s.starts_with('$') {
                    Ok(ConfigColor::Variable(s.to_string()))
                } else {
                    let color = Color::parse(s).ok_or_else(|| {
                        DecodeError::conversion(value, "invalid hex literal")
                    })?;
                    Ok(ConfigColor::Literal(color))
                }
            }
            _ => Err(DecodeError::conversion(value, "invalid hex literal")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r##"
tooltip {
    margin 12.0
    arrow-width 16.0
    show-arrow false
    padding {
        top 2.0
        left 10.0
    }
    background "$surface"
    border-color "#89b4fa"
    transition "identity"
    border-join "seam"
    tracking {
        horizontal 0.5
    }
    animation {
        enabled true
        period-ms 2000
        easing "linear"
    }
}
window {
    width 390.0
    height 844.0
    safe-area {
        top 44.0
        bottom 34.0
    }
}
anchors {
    anchor "Save" side="top-left" text="Save the file" z-index=3.0
    anchor "Open"
}
"##;

    fn colors() -> ColorVars {
        ColorVars::parse("colors.kdl", "surface \"#1e1e2e\"\n").unwrap()
    }

    #[test]
    fn sample_config_hydrates() {
        let config = RawConfig::parse("config.kdl", SAMPLE)
            .unwrap()
            .hydrate(&colors());
        let tooltip = &config.tooltip;

        assert_eq!(tooltip.margin, 12.0);
        assert_eq!(tooltip.arrow_width, 16.0);
        assert_eq!(tooltip.arrow_height, 6.0);
        assert!(!tooltip.show_arrow);
        assert_eq!(
            tooltip.padding,
            Padding {
                top: 2.0,
                right: 8.0,
                bottom: 4.0,
                left: 10.0
            }
        );
        assert_eq!(tooltip.background, Color::parse("#1e1e2e").unwrap());
        assert_eq!(tooltip.transition, Transition::Identity);
        assert_eq!(tooltip.border_join, BorderJoin::Seam);
        assert_eq!(tooltip.tracking.horizontal, 0.5);
        assert_eq!(tooltip.tracking.vertical, 0.0);
        assert!(tooltip.animation.enabled);
        assert_eq!(tooltip.animation.period, Duration::from_secs(2));
        assert_eq!(tooltip.animation.easing, Easing::Linear);
        assert_eq!(tooltip.animation.offset, 10.0);

        assert_eq!(config.window.size, Size::new(390.0, 844.0));
        assert_eq!(config.window.safe_area.top, 44.0);
        assert_eq!(config.window.safe_area.bottom, 34.0);
    }

    #[test]
    fn anchors_inherit_the_shared_tooltip_settings() {
        let config = RawConfig::parse("config.kdl", SAMPLE)
            .unwrap()
            .hydrate(&colors());
        assert_eq!(config.anchors.len(), 2);

        let save = &config.anchors[0];
        assert_eq!(save.label, "Save");
        assert_eq!(save.text, "Save the file");
        assert_eq!(save.tooltip.side, Side::TopLeft);
        assert_eq!(save.tooltip.z_index, 3.0);
        assert_eq!(save.tooltip.margin, 12.0);

        let open = &config.anchors[1];
        assert_eq!(open.tooltip.side, Side::Bottom);
        assert_eq!(open.tooltip.z_index, 10000.0);
        assert_eq!(open.text, "Tooltip on the bottom side");
    }

    #[test]
    fn empty_config_gets_one_anchor_per_side() {
        let config = Config::default();
        assert_eq!(config.tooltip, TooltipConfig::default());
        let sides: Vec<Side> =
            config.anchors.iter().map(|a| a.tooltip.side).collect();
        assert_eq!(sides, Side::ALL.to_vec());
        assert_eq!(config.window.safe_area, Insets::ZERO);
    }

    #[test]
    fn default_config_asset_parses() {
        let text = include_str!("../../assets/default-config.kdl");
        let config = RawConfig::parse("default-config.kdl", text)
            .unwrap()
            .hydrate(&ColorVars::default());
        assert_eq!(config.anchors.len(), 9);
    }

    #[test]
    fn unknown_side_is_rejected() {
        let text = "tooltip {\n    side \"sideways\"\n}\n";
        assert!(RawConfig::parse("config.kdl", text).is_err());
    }

    #[test]
    fn bad_hex_literal_is_rejected() {
        let text = "tooltip {\n    background \"#zzzzzz\"\n}\n";
        assert!(RawConfig::parse("config.kdl", text).is_err());
        assert!(ColorVars::parse("colors.kdl", "accent \"nope\"\n").is_err());
    }

    #[test]
    fn undefined_variable_falls_back_to_red() {
        let color = ConfigColor::Variable("$missing".to_string());
        assert_eq!(
            color.resolve(&ColorVars::default()),
            Color::from_rgb(1.0, 0.0, 0.0)
        );
        assert_eq!(
            ConfigColor::Variable("$surface".to_string()).resolve(&colors()),
            Color::parse("#1e1e2e").unwrap()
        );
    }
}
