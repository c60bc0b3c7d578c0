//! Style engine probes
//!
//! Each probe asks the style engine whether it accepts one declaration.

use super::{Probe, ProbeCategory, ProbeError};
use crate::host::BrowserEnvironment;

pub const STYLE_PROBES: [Probe; 6] = [
    Probe::new(
        "color-mix",
        ProbeCategory::Style,
        true,
        "color-mix() colors",
        color_mix,
    ),
    Probe::new(
        "backdrop-filter",
        ProbeCategory::Style,
        false,
        "Backdrop blur",
        backdrop_filter,
    ),
    Probe::new(
        "css-grid",
        ProbeCategory::Style,
        true,
        "Grid layout",
        css_grid,
    ),
    Probe::new(
        "css-custom-properties",
        ProbeCategory::Style,
        true,
        "Custom properties",
        css_custom_properties,
    ),
    Probe::new(
        "flexbox-gap",
        ProbeCategory::Style,
        false,
        "Flexbox gap",
        flexbox_gap,
    ),
    Probe::new(
        "container-queries",
        ProbeCategory::Style,
        false,
        "Container queries",
        container_queries,
    ),
];

fn color_mix(env: &dyn BrowserEnvironment) -> Result<bool, ProbeError> {
    env.css_supports("color", "color-mix(in srgb, red 50%, blue 50%)")
}

fn backdrop_filter(env: &dyn BrowserEnvironment) -> Result<bool, ProbeError> {
    env.css_supports("backdrop-filter", "blur(10px)")
}

fn css_grid(env: &dyn BrowserEnvironment) -> Result<bool, ProbeError> {
    env.css_supports("display", "grid")
}

fn css_custom_properties(env: &dyn BrowserEnvironment) -> Result<bool, ProbeError> {
    env.css_supports("color", "var(--test)")
}

fn flexbox_gap(env: &dyn BrowserEnvironment) -> Result<bool, ProbeError> {
    env.css_supports("gap", "10px")
}

fn container_queries(env: &dyn BrowserEnvironment) -> Result<bool, ProbeError> {
    env.css_supports("container-type", "size")
}
