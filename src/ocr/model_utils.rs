//! Shared utilities for OCR backends.
//!
//! Provides common functionality for:
//! - Checking for CLI tool availability
//! - Detecting a usable GPU

use std::process::Command;

use serde::{Deserialize, Serialize};

/// Check if a binary is available in PATH.
pub fn check_binary(name: &str) -> bool {
    which::which(name).is_ok()
}

/// Check whether a CUDA-capable GPU is usable.
///
/// Looks for `nvidia-smi` and asks it to list devices; any failure means no GPU.
pub fn is_gpu_available() -> bool {
    if !check_binary("nvidia-smi") {
        return false;
    }
    Command::new("nvidia-smi")
        .arg("-L")
        .output()
        .map(|o| o.status.success() && !o.stdout.is_empty())
        .unwrap_or(false)
}

/// GPU selection policy.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum GpuMode {
    /// Use a GPU when one is detected.
    #[default]
    Auto,
    /// Always request the GPU.
    On,
    /// Never use the GPU.
    Off,
}

impl GpuMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GpuMode::Auto => "auto",
            GpuMode::On => "on",
            GpuMode::Off => "off",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "auto" => Some(GpuMode::Auto),
            "on" | "true" | "1" | "yes" => Some(GpuMode::On),
            "off" | "false" | "0" | "no" => Some(GpuMode::Off),
            _ => None,
        }
    }

    /// Decide whether to use the GPU.
    pub fn resolve(&self) -> bool {
        match self {
            GpuMode::Auto => is_gpu_available(),
            GpuMode::On => true,
            GpuMode::Off => false,
        }
    }
}
