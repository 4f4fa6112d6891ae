// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Class id to label mapping

/// COCO-80 labels, used when the ONNX file carries no `names` metadata
pub const COCO_CLASSES: [&str; 80] = [
    "person", "bicycle", "car", "motorcycle", "airplane", "bus", "train", "truck", "boat",
    "traffic light", "fire hydrant", "stop sign", "parking meter", "bench", "bird", "cat", "dog",
    "horse", "sheep", "cow", "elephant", "bear", "zebra", "giraffe", "backpack", "umbrella",
    "handbag", "tie", "suitcase", "frisbee", "skis", "snowboard", "sports ball", "kite",
    "baseball bat", "baseball glove", "skateboard", "surfboard", "tennis racket", "bottle",
    "wine glass", "cup", "fork", "knife", "spoon", "bowl", "banana", "apple", "sandwich",
    "orange", "broccoli", "carrot", "hot dog", "pizza", "donut", "cake", "chair", "couch",
    "potted plant", "bed", "dining table", "toilet", "tv", "laptop", "mouse", "remote",
    "keyboard", "cell phone", "microwave", "oven", "toaster", "sink", "refrigerator", "book",
    "clock", "vase", "scissors", "teddy bear", "hair drier", "toothbrush",
];

/// Ordered label list indexed by class id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassNames(Vec<String>);

impl ClassNames {
    pub fn new(names: Vec<String>) -> Self {
        Self(names)
    }

    pub fn coco() -> Self {
        Self(COCO_CLASSES.iter().map(|s| s.to_string()).collect())
    }

    pub fn get(&self, class_id: usize) -> Option<&str> {
        self.0.get(class_id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parse the `names` metadata Ultralytics writes into exported models
    ///
    /// The value is a Python dict literal, e.g. `{0: 'person', 1: 'bicycle'}`.
    /// Ids must be contiguous from zero; anything else returns `None`.
    pub fn from_metadata(raw: &str) -> Option<Self> {
        let body = raw.trim().strip_prefix('{')?.strip_suffix('}')?;

        let mut entries: Vec<(usize, String)> = Vec::new();
        let mut rest = body.trim();
        while !rest.is_empty() {
            let (id_part, after_id) = rest.split_once(':')?;
            let id: usize = id_part.trim().parse().ok()?;

            let after_id = after_id.trim_start();
            let quote = after_id.chars().next().filter(|c| *c == '\'' || *c == '"')?;
            let value_and_rest = &after_id[1..];
            let end = value_and_rest.find(quote)?;
            entries.push((id, value_and_rest[..end].to_string()));

            rest = value_and_rest[end + 1..].trim_start();
            rest = rest.strip_prefix(',').unwrap_or(rest).trim_start();
        }

        if entries.is_empty() {
            return None;
        }
        entries.sort_by_key(|(id, _)| *id);
        if entries.iter().enumerate().any(|(i, (id, _))| i != *id) {
            return None;
        }

        Some(Self(entries.into_iter().map(|(_, name)| name).collect()))
    }
}

impl Default for ClassNames {
    fn default() -> Self {
        Self::coco()
    }
}
