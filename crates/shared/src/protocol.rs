use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{domain::PrimitiveId, error::DecodeError, error::SettingsInputError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WirePrimitive {
    pub id: PrimitiveId,
    #[serde(rename = "type")]
    pub kind: String,
    pub layer: String,
    pub width: f64,
    pub points: Vec<Vec<f64>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireNet {
    pub name: String,
    pub primitives: Vec<WirePrimitive>,
}

/// Response of `get_nets`. The engine answers `{}` before any design is open.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetsPayload {
    #[serde(default)]
    pub nets: Vec<WireNet>,
}

/// Response of `load_edb`: either the loaded nets or an engine-side error.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LoadEdbResponse {
    Failed { error: String },
    Loaded(NetsPayload),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireStats {
    pub s: Vec<f64>,
    pub w_s: Vec<f64>,
    pub mu_w: f64,
}

/// Width-vs-arclength samples for one primitive. `s` and `w_s` always have the
/// same, non-zero length.
#[derive(Debug, Clone, PartialEq)]
pub struct VariationStats {
    primitive_id: PrimitiveId,
    s: Vec<f64>,
    w_s: Vec<f64>,
    mu_w: f64,
}

impl VariationStats {
    /// An empty sample set is an absent result, not an error.
    pub fn from_wire(
        primitive_id: PrimitiveId,
        wire: WireStats,
    ) -> Result<Option<Self>, DecodeError> {
        if wire.s.len() != wire.w_s.len() {
            return Err(DecodeError::StatsLengthMismatch {
                primitive: primitive_id,
                s_len: wire.s.len(),
                w_len: wire.w_s.len(),
            });
        }
        if wire.s.is_empty() {
            return Ok(None);
        }
        Ok(Some(Self {
            primitive_id,
            s: wire.s,
            w_s: wire.w_s,
            mu_w: wire.mu_w,
        }))
    }

    pub fn primitive_id(&self) -> &PrimitiveId {
        &self.primitive_id
    }

    pub fn s(&self) -> &[f64] {
        &self.s
    }

    pub fn w_s(&self) -> &[f64] {
        &self.w_s
    }

    pub fn mu_w(&self) -> f64 {
        self.mu_w
    }

    pub fn len(&self) -> usize {
        self.s.len()
    }

    pub fn is_empty(&self) -> bool {
        self.s.is_empty()
    }

    pub fn samples(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.s.iter().copied().zip(self.w_s.iter().copied())
    }

    pub fn width_range(&self) -> (f64, f64) {
        self.w_s
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), w| {
                (lo.min(*w), hi.max(*w))
            })
    }

    pub fn arc_length(&self) -> f64 {
        match (self.s.first(), self.s.last()) {
            (Some(first), Some(last)) => last - first,
            _ => 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariationModel {
    Exponential,
    Gaussian,
    #[default]
    Matern32,
    BandLimited,
}

impl VariationModel {
    pub const ALL: [VariationModel; 4] = [
        VariationModel::Exponential,
        VariationModel::Gaussian,
        VariationModel::Matern32,
        VariationModel::BandLimited,
    ];

    pub fn wire_name(self) -> &'static str {
        match self {
            VariationModel::Exponential => "exponential",
            VariationModel::Gaussian => "gaussian",
            VariationModel::Matern32 => "matern32",
            VariationModel::BandLimited => "band_limited",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            VariationModel::Exponential => "Exponential",
            VariationModel::Gaussian => "Gaussian",
            VariationModel::Matern32 => "Matern32",
            VariationModel::BandLimited => "Band Limited",
        }
    }
}

impl fmt::Display for VariationModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

impl FromStr for VariationModel {
    type Err = ();

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let raw = raw.trim();
        VariationModel::ALL
            .into_iter()
            .find(|model| model.wire_name().eq_ignore_ascii_case(raw))
            .ok_or(())
    }
}

/// Variation model parameters sent with `generate_variation`. Cross-field
/// consistency is the engine's job.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub sigma_w: f64,
    #[serde(rename = "L_c")]
    pub l_c: f64,
    pub model: VariationModel,
    pub ds_arc: f64,
    pub n_resample: u32,
    pub w_min: f64,
    pub w_max: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sigma_w: 10.0,
            l_c: 0.002,
            model: VariationModel::Matern32,
            ds_arc: 2e-4,
            n_resample: 1200,
            w_min: 80.0,
            w_max: 120.0,
        }
    }
}

impl Settings {
    pub fn merged(mut self, patch: &SettingsPatch) -> Self {
        if let Some(v) = patch.sigma_w {
            self.sigma_w = v;
        }
        if let Some(v) = patch.l_c {
            self.l_c = v;
        }
        if let Some(v) = patch.model {
            self.model = v;
        }
        if let Some(v) = patch.ds_arc {
            self.ds_arc = v;
        }
        if let Some(v) = patch.n_resample {
            self.n_resample = v;
        }
        if let Some(v) = patch.w_min {
            self.w_min = v;
        }
        if let Some(v) = patch.w_max {
            self.w_max = v;
        }
        self
    }
}

/// Partial settings update; absent fields keep their current value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SettingsPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sigma_w: Option<f64>,
    #[serde(default, rename = "L_c", skip_serializing_if = "Option::is_none")]
    pub l_c: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<VariationModel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ds_arc: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n_resample: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub w_min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub w_max: Option<f64>,
}

impl SettingsPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Parses `field=value` as typed by an operator. Numbers must be finite;
    /// `n_resample` accepts a float and rounds it, matching how number inputs
    /// are coerced.
    pub fn parse_assignment(raw: &str) -> Result<Self, SettingsInputError> {
        let (field, value) = raw
            .split_once('=')
            .ok_or_else(|| SettingsInputError::MissingValue(raw.to_string()))?;
        Self::parse_field(field.trim(), value.trim())
    }

    pub fn parse_field(field: &str, value: &str) -> Result<Self, SettingsInputError> {
        let mut patch = Self::default();
        match field {
            "sigma_w" => patch.sigma_w = Some(parse_number("sigma_w", value)?),
            "L_c" | "l_c" => patch.l_c = Some(parse_number("L_c", value)?),
            "ds_arc" => patch.ds_arc = Some(parse_number("ds_arc", value)?),
            "w_min" => patch.w_min = Some(parse_number("w_min", value)?),
            "w_max" => patch.w_max = Some(parse_number("w_max", value)?),
            "n_resample" => {
                let parsed = parse_number("n_resample", value)?;
                if parsed < 0.0 || parsed > f64::from(u32::MAX) {
                    return Err(SettingsInputError::InvalidValue {
                        field: "n_resample",
                        value: value.to_string(),
                    });
                }
                patch.n_resample = Some(parsed.round() as u32);
            }
            "model" => {
                let model = value
                    .parse::<VariationModel>()
                    .map_err(|()| SettingsInputError::InvalidValue {
                        field: "model",
                        value: value.to_string(),
                    })?;
                patch.model = Some(model);
            }
            other => return Err(SettingsInputError::UnknownField(other.to_string())),
        }
        Ok(patch)
    }

    /// Combines two patches; fields set in `other` win.
    pub fn and(self, other: &SettingsPatch) -> Self {
        Self {
            sigma_w: other.sigma_w.or(self.sigma_w),
            l_c: other.l_c.or(self.l_c),
            model: other.model.or(self.model),
            ds_arc: other.ds_arc.or(self.ds_arc),
            n_resample: other.n_resample.or(self.n_resample),
            w_min: other.w_min.or(self.w_min),
            w_max: other.w_max.or(self.w_max),
        }
    }
}

fn parse_number(field: &'static str, value: &str) -> Result<f64, SettingsInputError> {
    value
        .parse::<f64>()
        .ok()
        .filter(|parsed| parsed.is_finite())
        .ok_or_else(|| SettingsInputError::InvalidValue {
            field,
            value: value.to_string(),
        })
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathRequest {
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub settings: Settings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsRequest {
    pub id: PrimitiveId,
}

#[cfg(test)]
#[path = "tests/protocol_tests.rs"]
mod tests;
