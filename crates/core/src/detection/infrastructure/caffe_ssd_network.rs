use std::path::Path;

use ndarray::Array4;
use opencv::core::{Mat, Scalar, CV_32F};
use opencv::dnn;
use opencv::prelude::*;

use super::deep_detector::{SsdCandidate, SsdNetwork};
use crate::detection::domain::backend_kind::BackendKind;
use crate::detection::domain::detection_backend::BackendError;

/// Values per SSD detection row: `[image_id, label, confidence, x1, y1, x2, y2]`.
const SSD_ROW_LEN: usize = 7;

/// ResNet-10 SSD face network loaded through OpenCV's Caffe importer.
pub struct CaffeSsdNetwork {
    net: dnn::Net,
}

impl CaffeSsdNetwork {
    pub fn load(topology: &Path, weights: &Path) -> Result<Self, BackendError> {
        let net = dnn::read_net_from_caffe(utf8(topology)?, utf8(weights)?)
            .map_err(|e| BackendError::load(BackendKind::Caffe, weights, e))?;
        let empty = net
            .empty()
            .map_err(|e| BackendError::load(BackendKind::Caffe, weights, e))?;
        if empty {
            return Err(BackendError::load(
                BackendKind::Caffe,
                topology,
                "network has no layers",
            ));
        }
        Ok(Self { net })
    }
}

impl SsdNetwork for CaffeSsdNetwork {
    fn forward(
        &mut self,
        blob: &Array4<f32>,
    ) -> Result<Vec<SsdCandidate>, Box<dyn std::error::Error>> {
        let shape: Vec<i32> = blob.shape().iter().map(|&d| d as i32).collect();
        let mut input = Mat::new_nd_with_default(&shape, CV_32F, Scalar::all(0.0))?;
        let values = blob.as_slice().ok_or("blob is not in standard layout")?;
        input.data_typed_mut::<f32>()?.copy_from_slice(values);

        self.net.set_input_def(&input)?;
        let output = self.net.forward_single_def()?;
        Ok(parse_rows(output.data_typed::<f32>()?))
    }
}

fn parse_rows(values: &[f32]) -> Vec<SsdCandidate> {
    values
        .chunks_exact(SSD_ROW_LEN)
        .map(|row| SsdCandidate {
            confidence: row[2],
            bbox: [row[3], row[4], row[5], row[6]],
        })
        .collect()
}

fn utf8(path: &Path) -> Result<&str, BackendError> {
    path.to_str()
        .ok_or_else(|| BackendError::load(BackendKind::Caffe, path, "path is not valid UTF-8"))
}
