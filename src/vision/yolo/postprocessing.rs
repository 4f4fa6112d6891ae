// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Decoding of raw YOLO output tensors into detections

use ndarray::{ArrayViewD, Axis, Ix2};

use super::model::{ModelError, RawDetection};
use super::preprocessing::Letterbox;

/// Candidate filtering applied after the forward pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PostprocessConfig {
    pub confidence_threshold: f32,
    pub iou_threshold: f32,
    pub max_detections: usize,
}

/// Row layout of a YOLO head
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputLayout {
    /// `[1, 4 + nc, N]`: cx, cy, w, h followed by class scores (v5u/v8/v11 heads)
    Anchorless,
    /// `[1, N, 5 + nc]`: cx, cy, w, h, objectness, class scores (classic v5 heads)
    Objectness,
}

impl OutputLayout {
    /// Work out the layout from the output shape and the number of labels
    pub fn infer(shape: &[usize], num_classes: usize) -> Result<Self, ModelError> {
        if shape.len() != 3 || shape[0] != 1 {
            return Err(ModelError::OutputShape(shape.to_vec()));
        }
        if shape[1] == 4 + num_classes {
            Ok(Self::Anchorless)
        } else if shape[2] == 5 + num_classes {
            Ok(Self::Objectness)
        } else if shape[1] < shape[2] && shape[1] > 4 {
            Ok(Self::Anchorless)
        } else if shape[2] > 5 {
            Ok(Self::Objectness)
        } else {
            Err(ModelError::OutputShape(shape.to_vec()))
        }
    }
}

/// Turn a raw output tensor into source-space detections
///
/// Candidates under the threshold are dropped, the rest go through per-class
/// NMS. Survivors come back highest score first, capped at `max_detections`.
pub fn decode_output(
    output: ArrayViewD<f32>,
    num_classes: usize,
    letterbox: &Letterbox,
    config: &PostprocessConfig,
) -> Result<Vec<RawDetection>, ModelError> {
    let layout = OutputLayout::infer(output.shape(), num_classes)?;

    let batch = output
        .index_axis(Axis(0), 0)
        .into_dimensionality::<Ix2>()
        .map_err(|_| ModelError::OutputShape(output.shape().to_vec()))?;

    // rows are candidates, columns are box + scores
    let rows = match layout {
        OutputLayout::Anchorless => batch.reversed_axes(),
        OutputLayout::Objectness => batch,
    };
    let score_offset = match layout {
        OutputLayout::Anchorless => 4,
        OutputLayout::Objectness => 5,
    };

    let mut candidates = Vec::new();
    for row in rows.outer_iter() {
        if row.len() <= score_offset {
            continue;
        }
        let objectness = match layout {
            OutputLayout::Anchorless => 1.0,
            OutputLayout::Objectness => row[4],
        };

        let best = row
            .iter()
            .skip(score_offset)
            .copied()
            .enumerate()
            .fold(None, |best: Option<(usize, f32)>, (idx, score)| match best {
                Some((_, s)) if s >= score => best,
                _ => Some((idx, score)),
            });

        let Some((class_id, class_score)) = best else {
            continue;
        };
        let confidence = class_score * objectness;
        if !confidence.is_finite() || confidence <= config.confidence_threshold {
            continue;
        }

        let (cx, cy, w, h) = (row[0], row[1], row[2], row[3]);
        let xyxy = letterbox.to_source([
            cx - w / 2.0,
            cy - h / 2.0,
            cx + w / 2.0,
            cy + h / 2.0,
        ]);

        candidates.push(RawDetection {
            class_id,
            confidence,
            xyxy,
        });
    }

    Ok(non_maximum_suppression(
        candidates,
        config.iou_threshold,
        config.max_detections,
    ))
}

/// Class-aware greedy NMS
pub fn non_maximum_suppression(
    mut candidates: Vec<RawDetection>,
    iou_threshold: f32,
    max_detections: usize,
) -> Vec<RawDetection> {
    candidates.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

    let mut kept: Vec<RawDetection> = Vec::new();
    for candidate in candidates {
        if kept.len() >= max_detections {
            break;
        }
        let suppressed = kept
            .iter()
            .any(|k| k.class_id == candidate.class_id && k.iou(&candidate) > iou_threshold);
        if !suppressed {
            kept.push(candidate);
        }
    }
    kept
}
