// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Compute device selection for the detector

use std::fmt;
use std::str::FromStr;

use ort::execution_providers::{
    CPUExecutionProvider, CUDAExecutionProvider, ExecutionProvider, ExecutionProviderDispatch,
};
use tracing::{debug, info, warn};

/// Device the detector session is bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Device {
    Cpu,
    Cuda,
}

impl Device {
    pub fn as_str(&self) -> &'static str {
        match self {
            Device::Cpu => "cpu",
            Device::Cuda => "cuda",
        }
    }

    /// Execution providers to register, in priority order
    pub fn execution_providers(&self) -> Vec<ExecutionProviderDispatch> {
        match self {
            Device::Cuda => vec![
                CUDAExecutionProvider::default().build(),
                CPUExecutionProvider::default().build(),
            ],
            Device::Cpu => vec![CPUExecutionProvider::default().build()],
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Requested device, as configured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DevicePreference {
    /// CUDA when the runtime reports it, CPU otherwise
    #[default]
    Auto,
    Cpu,
    Cuda,
}

impl FromStr for DevicePreference {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "cpu" => Ok(Self::Cpu),
            "cuda" | "gpu" => Ok(Self::Cuda),
            other => Err(format!(
                "unknown device '{}', expected one of: auto, cpu, cuda",
                other
            )),
        }
    }
}

/// Resolve a preference into the device the session will use
///
/// An explicit `cuda` request on a host without CUDA falls back to CPU with a
/// warning rather than refusing to start.
pub fn select_device(preference: DevicePreference) -> Device {
    match preference {
        DevicePreference::Cpu => Device::Cpu,
        DevicePreference::Auto => {
            if cuda_available() {
                Device::Cuda
            } else {
                Device::Cpu
            }
        }
        DevicePreference::Cuda => {
            if cuda_available() {
                Device::Cuda
            } else {
                warn!("CUDA requested but not available, falling back to CPU");
                Device::Cpu
            }
        }
    }
}

fn cuda_available() -> bool {
    match CUDAExecutionProvider::default().is_available() {
        Ok(available) => {
            debug!("CUDA execution provider available: {}", available);
            available
        }
        Err(e) => {
            info!("Could not query CUDA execution provider: {}", e);
            false
        }
    }
}
