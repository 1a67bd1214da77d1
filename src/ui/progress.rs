use anyhow::{Context, Result, ensure};
use serde::Serialize;
use std::{fmt, str::FromStr, time::Duration};

/// Colour of a finished bar.
pub const PROGRESS_COLOR_DONE: Rgb = Rgb::new(0x32, 0x96, 0x37);
/// Colour of an empty bar.
pub const PROGRESS_COLOR_START: Rgb = Rgb::new(0x32, 0x88, 0x96);
/// Delay before a bar that reached 100% falls back to 0%.
pub const PROGRESS_RESET_DELAY: Duration = Duration::from_millis(1000);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Linear per-channel blend: `ratio` of `self` plus `1 - ratio` of `other`, rounded up.
    ///
    /// Ratios outside `0..=1` are accepted; channels saturate at 0 and 255.
    pub fn blend(self, other: Rgb, ratio: f64) -> Rgb {
        let channel = |a: u8, b: u8| -> u8 {
            let mixed = (f64::from(a) * ratio + f64::from(b) * (1.0 - ratio)).ceil();
            mixed.clamp(0.0, 255.0) as u8
        };

        Rgb {
            r: channel(self.r, other.r),
            g: channel(self.g, other.g),
            b: channel(self.b, other.b),
        }
    }
}

impl FromStr for Rgb {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let hex = s.strip_prefix('#').unwrap_or(s);
        ensure!(
            hex.len() == 6 && hex.is_ascii(),
            "failed to parse color {s:?}: expected 6 hex digits"
        );

        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16)
                .with_context(|| format!("failed to parse color {s:?}"))
        };

        Ok(Rgb {
            r: channel(0..2)?,
            g: channel(2..4)?,
            b: channel(4..6)?,
        })
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Hex gradient between two `rrggbb` colours; `ratio` 1 yields `color1`, 0 yields `color2`.
pub fn gradient(ratio: f64, color1: &str, color2: &str) -> Result<String> {
    let color1 = color1.parse::<Rgb>()?;
    let color2 = color2.parse::<Rgb>()?;
    Ok(color1.blend(color2, ratio).to_string())
}

/// State of a progress bar element.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProgressBar {
    percentage: f64,
    color: Rgb,
    text: String,
}

impl Default for ProgressBar {
    fn default() -> Self {
        let mut bar = Self {
            percentage: 0.0,
            color: PROGRESS_COLOR_START,
            text: String::new(),
        };
        bar.show(0.0);
        bar
    }
}

impl ProgressBar {
    /// Display `percentage` (0–100).
    ///
    /// Returns `true` when the bar reached 100% and must be reset to 0% after
    /// [`PROGRESS_RESET_DELAY`].
    pub fn show(&mut self, percentage: f64) -> bool {
        self.percentage = percentage;
        self.color = PROGRESS_COLOR_DONE.blend(PROGRESS_COLOR_START, percentage / 100.0);
        self.text = format!("{}%", percentage.round());

        percentage == 100.0
    }

    pub fn percentage(&self) -> f64 {
        self.percentage
    }

    pub fn color(&self) -> Rgb {
        self.color
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn width(&self) -> String {
        format!("{}%", self.percentage)
    }

    pub fn render(&self) -> String {
        format!(
            r#"<div class="progress-bar" style="width: {}; background-color: {}">{}</div>"#,
            self.width(),
            self.color,
            self.text
        )
    }
}
