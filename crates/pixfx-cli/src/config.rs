//! YAML job files.
//!
//! A job names a synthetic source and an ordered list of steps. Each step
//! carries the engine's own parameter struct, so every field is optional and
//! falls back to the engine default.
//!
//! ```yaml
//! source:
//!   pattern: checker
//!   width: 128
//!   height: 96
//! steps:
//!   - op: blur
//!     h_radius: 2.5
//!     v_radius: 2.5
//!     iterations: 3
//!   - op: convolve
//!     kernel: { preset: gaussian, size: 5, sigma: 1.2 }
//!     edge_action: wrap
//!   - op: convolve
//!     kernel: { width: 3, height: 1, weights: [0.25, 0.5, 0.25] }
//!   - op: smear
//!     shape: circles
//!     density: 0.2
//!     seed: 7
//! ```

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use pixfx_ops::{BlurParams, ConvolveParams, Kernel, SmearParams};
use serde::{Deserialize, Serialize};
#[allow(unused_imports)]
use tracing::{debug, trace};

use crate::error::{ConfigError, ConfigResult};
use crate::pattern::SourceSpec;

/// A complete job: source plus steps.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Job {
    /// Source image description.
    pub source: SourceSpec,
    /// Steps applied in order.
    pub steps: Vec<Step>,
}

impl Job {
    /// Loads a job from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        let job = Self::from_yaml_str(&content)?;
        debug!(path = %path.display(), steps = job.steps.len(), "Loaded job");
        Ok(job)
    }

    /// Parses a job from a YAML string.
    pub fn from_yaml_str(yaml: &str) -> ConfigResult<Self> {
        let job: Job = serde_yaml::from_str(yaml)?;
        // Check kernel sizes and weights before any pixel work
        for step in &job.steps {
            if let Step::Convolve(c) = step {
                c.kernel.build()?;
            }
        }
        Ok(job)
    }

    /// Serializes the job back to YAML.
    pub fn to_yaml_string(&self) -> ConfigResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

/// One pipeline step, tagged by `op`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    /// Box blur.
    Blur(BlurParams),
    /// Kernel convolution.
    Convolve(ConvolveStep),
    /// Stochastic smear.
    Smear(SmearParams),
}

impl Step {
    /// Step name as written in job files.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Blur(_) => "blur",
            Self::Convolve(_) => "convolve",
            Self::Smear(_) => "smear",
        }
    }
}

/// Convolution step: a kernel plus the engine parameters.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ConvolveStep {
    /// Kernel description.
    #[serde(default)]
    pub kernel: KernelSpec,
    /// Engine parameters.
    #[serde(flatten)]
    pub params: ConvolveParams,
}

/// Named kernel presets.
///
/// Job files accept the same aliases as the command line, so an unknown name
/// fails while the YAML is parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KernelPreset {
    /// Pass-through.
    #[serde(alias = "none")]
    Identity,
    /// Uniform average.
    #[serde(alias = "average")]
    Box,
    /// Normalized Gaussian.
    #[serde(alias = "gauss")]
    Gaussian,
    /// 3x3 sharpen.
    Sharpen,
    /// 3x3 Laplacian.
    #[serde(alias = "edge_detect", alias = "laplacian")]
    Edge,
    /// 3x3 emboss.
    Emboss,
    /// Seeded random kernel.
    Random,
}

impl KernelPreset {
    /// Lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Identity => "identity",
            Self::Box => "box",
            Self::Gaussian => "gaussian",
            Self::Sharpen => "sharpen",
            Self::Edge => "edge",
            Self::Emboss => "emboss",
            Self::Random => "random",
        }
    }
}

impl fmt::Display for KernelPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for KernelPreset {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "identity" | "none" => Ok(Self::Identity),
            "box" | "average" => Ok(Self::Box),
            "gaussian" | "gauss" => Ok(Self::Gaussian),
            "sharpen" => Ok(Self::Sharpen),
            "edge" | "edge_detect" | "laplacian" => Ok(Self::Edge),
            "emboss" => Ok(Self::Emboss),
            "random" => Ok(Self::Random),
            _ => Err(ConfigError::UnknownKernel(s.to_string())),
        }
    }
}

/// Kernel description: either a preset or explicit weights.
///
/// Explicit `weights` win over `preset`. Without `width`/`height` they form a
/// single row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelSpec {
    /// Preset.
    pub preset: Option<KernelPreset>,
    /// Size for identity, box, gaussian and random presets.
    pub size: usize,
    /// Gaussian standard deviation.
    pub sigma: f32,
    /// Sharpen strength.
    pub amount: f32,
    /// Seed for the random preset.
    pub seed: u64,
    /// Explicit kernel width.
    pub width: Option<usize>,
    /// Explicit kernel height.
    pub height: Option<usize>,
    /// Explicit weights, row-major.
    pub weights: Option<Vec<f32>>,
}

impl Default for KernelSpec {
    fn default() -> Self {
        Self {
            preset: None,
            size: 3,
            sigma: 1.0,
            amount: 1.0,
            seed: 0,
            width: None,
            height: None,
            weights: None,
        }
    }
}

impl KernelSpec {
    /// A preset kernel with default size and strength.
    pub fn preset(preset: KernelPreset) -> Self {
        Self {
            preset: Some(preset),
            ..Self::default()
        }
    }

    /// Builds the kernel.
    pub fn build(&self) -> ConfigResult<Kernel> {
        if let Some(weights) = &self.weights {
            let width = self.width.unwrap_or(weights.len());
            let height = self.height.unwrap_or(1);
            return Kernel::new(weights.clone(), width, height)
                .map_err(|e| ConfigError::InvalidKernel(e.to_string()));
        }

        let preset = self
            .preset
            .ok_or_else(|| ConfigError::InvalidKernel("kernel needs a preset or weights".into()))?;
        trace!(%preset, size = self.size, sigma = self.sigma, amount = self.amount, "KernelSpec::build");

        if self.size == 0 {
            return Err(ConfigError::InvalidKernel("size must be >= 1".into()));
        }
        let kernel = match preset {
            KernelPreset::Identity => Kernel::identity(self.size),
            KernelPreset::Box => Kernel::box_blur(self.size),
            KernelPreset::Gaussian => {
                if !(self.sigma > 0.0 && self.sigma.is_finite()) {
                    return Err(ConfigError::InvalidKernel(format!(
                        "gaussian sigma must be > 0, got {}",
                        self.sigma
                    )));
                }
                Kernel::gaussian(self.size, self.sigma)
            }
            KernelPreset::Sharpen => Kernel::sharpen(self.amount),
            KernelPreset::Edge => Kernel::edge_detect(),
            KernelPreset::Emboss => Kernel::emboss(),
            KernelPreset::Random => Kernel::random(self.size, self.seed),
        };
        Ok(kernel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixfx_ops::{EdgeAction, KernelShape, SmearShape};
    use std::fs;
    use tempfile::tempdir;

    const JOB: &str = r#"
source:
  pattern: noise
  width: 32
  height: 24
  seed: 5
steps:
  - op: blur
    h_radius: 2.5
    iterations: 3
  - op: convolve
    kernel: { preset: gaussian, size: 5, sigma: 1.2 }
    edge_action: wrap
    include_alpha: false
  - op: convolve
    kernel: { weights: [0.25, 0.5, 0.25] }
  - op: smear
    shape: diamonds
    density: 0.2
"#;

    #[test]
    fn test_parse_job() {
        let job = Job::from_yaml_str(JOB).unwrap();
        assert_eq!(job.source.width, 32);
        assert_eq!(job.steps.len(), 4);

        let Step::Blur(blur) = &job.steps[0] else { panic!("expected blur") };
        assert_eq!(blur.h_radius, 2.5);
        assert_eq!(blur.v_radius, 0.0);
        assert_eq!(blur.iterations, 3);
        assert!(blur.premultiply_alpha);

        let Step::Convolve(conv) = &job.steps[1] else { panic!("expected convolve") };
        assert_eq!(conv.params.edge_action, EdgeAction::Wrap);
        assert!(!conv.params.include_alpha);
        assert_eq!(conv.kernel.build().unwrap().dimensions(), (5, 5));

        let Step::Convolve(row) = &job.steps[2] else { panic!("expected convolve") };
        assert_eq!(row.params, ConvolveParams::default());
        assert_eq!(row.kernel.build().unwrap().shape(), KernelShape::Horizontal);

        let Step::Smear(smear) = &job.steps[3] else { panic!("expected smear") };
        assert_eq!(smear.shape, SmearShape::Diamonds);
        assert_eq!(smear.distance, 8);
        assert_eq!(job.steps[3].name(), "smear");
    }

    #[test]
    fn test_yaml_roundtrip() {
        let job = Job::from_yaml_str(JOB).unwrap();
        let again = Job::from_yaml_str(&job.to_yaml_string().unwrap()).unwrap();
        assert_eq!(job, again);
    }

    #[test]
    fn test_empty_job() {
        let job = Job::from_yaml_str("{}").unwrap();
        assert!(job.steps.is_empty());
        assert_eq!(job.source, SourceSpec::default());
    }

    #[test]
    fn test_unknown_kernel() {
        let yaml = "steps:\n  - op: convolve\n    kernel: { preset: blurry }\n";
        let err = Job::from_yaml_str(yaml).unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
        assert!(err.to_string().contains("blurry"), "{err}");

        let err = "blurry".parse::<KernelPreset>().unwrap_err();
        assert!(matches!(err, ConfigError::UnknownKernel(ref name) if name == "blurry"));
    }

    #[test]
    fn test_preset_aliases_in_yaml() {
        let yaml = "steps:\n  - op: convolve\n    kernel: { preset: laplacian }\n  - op: convolve\n    kernel: { preset: gauss, size: 5 }\n";
        let job = Job::from_yaml_str(yaml).unwrap();
        let presets: Vec<_> = job
            .steps
            .iter()
            .map(|step| match step {
                Step::Convolve(c) => c.kernel.preset,
                _ => None,
            })
            .collect();
        assert_eq!(presets, [Some(KernelPreset::Edge), Some(KernelPreset::Gaussian)]);

        // Written back under the canonical name
        let yaml = job.to_yaml_string().unwrap();
        assert!(yaml.contains("preset: edge"), "{yaml}");
        assert!(yaml.contains("preset: gaussian"), "{yaml}");
    }

    #[test]
    fn test_even_kernel_rejected() {
        let yaml = "steps:\n  - op: convolve\n    kernel: { width: 2, height: 1, weights: [0.5, 0.5] }\n";
        assert!(matches!(Job::from_yaml_str(yaml), Err(ConfigError::InvalidKernel(_))));
    }

    #[test]
    fn test_unknown_op() {
        let yaml = "steps:\n  - op: melt\n";
        assert!(matches!(Job::from_yaml_str(yaml), Err(ConfigError::Yaml(_))));
    }

    #[test]
    fn test_presets() {
        for name in ["identity", "box", "gaussian", "sharpen", "edge", "emboss", "random"] {
            let preset: KernelPreset = name.parse().unwrap();
            assert_eq!(preset.to_string(), name);
            assert!(KernelSpec::preset(preset).build().is_ok(), "{name}");
        }
        assert!(KernelSpec { sigma: 0.0, ..KernelSpec::preset(KernelPreset::Gaussian) }.build().is_err());
        assert!(KernelSpec::default().build().is_err());
    }

    #[test]
    fn test_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("job.yaml");
        fs::write(&path, JOB).unwrap();
        let job = Job::from_file(&path).unwrap();
        assert_eq!(job, Job::from_yaml_str(JOB).unwrap());

        let bad = dir.path().join("bad.yaml");
        fs::write(&bad, "steps:\n  - op: convolve\n    kernel: { width: 4, weights: [1, 1, 1, 1] }\n").unwrap();
        assert!(matches!(Job::from_file(&bad), Err(ConfigError::InvalidKernel(_))));
    }

    #[test]
    fn test_missing_file() {
        let err = Job::from_file("/nonexistent/pixfx/job.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::NotFound { .. }));
    }
}
