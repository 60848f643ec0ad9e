//! Serializable summary of a registration run.

use serde::{Deserialize, Serialize};

use crate::canvas::CanvasInfo;
use crate::registration::pipeline::{FrameStatus, Registration};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameReport {
    pub index: usize,
    pub stars: usize,
    pub status: FrameStatus,
    pub dx: f64,
    pub dy: f64,
    pub rotation_deg: f64,
    pub scale: f64,
    pub inliers: usize,
    pub matches: usize,
    pub quality: f64,
    /// Human-readable rejection reason, if any.
    pub reject_reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistrationReport {
    pub reference_index: usize,
    pub canvas: CanvasInfo,
    pub frames: Vec<FrameReport>,
}

impl RegistrationReport {
    pub fn new(registration: &Registration, canvas: &CanvasInfo) -> Self {
        let frames = registration
            .frames
            .iter()
            .map(|frame| {
                let transform = frame.transform();
                let alignment = &frame.alignment;
                FrameReport {
                    index: frame.index,
                    stars: frame.star_count,
                    status: frame.status,
                    dx: transform.tx,
                    dy: transform.ty,
                    rotation_deg: transform.rotation.to_degrees(),
                    scale: transform.scale,
                    inliers: alignment.inlier_count,
                    matches: alignment.total_matches,
                    quality: alignment.quality_score,
                    reject_reason: alignment.reject_reason.map(|r| r.to_string()),
                }
            })
            .collect();

        Self {
            reference_index: registration.reference_index,
            canvas: *canvas,
            frames,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl Registration {
    pub fn report(&self, canvas: &CanvasInfo) -> RegistrationReport {
        RegistrationReport::new(self, canvas)
    }
}
