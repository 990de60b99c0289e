// 该文件是 Haishi （海市蜃楼） 项目的一部分。
// src/output/gallery_output.rs - 历史画廊输出
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde_json::json;
use tracing::info;

use crate::history::AnalysisRecord;
use crate::input::Frame;

use super::{Render, Visualizer};

/// 历史画廊输出
///
/// 每条分析记录在目录下落两个文件：画了边界框的快照
/// `analysis_NNNN.png`，以及检测明细的 `analysis_NNNN.json`。
pub struct GalleryOutput {
  /// 画廊目录
  directory: PathBuf,
  /// 可视化工具
  visualizer: Visualizer,
}

impl GalleryOutput {
  /// 创建一个新的画廊输出；目录不存在时创建
  pub fn new(directory: impl Into<PathBuf>) -> Result<Self> {
    let directory = directory.into();
    std::fs::create_dir_all(&directory)
      .with_context(|| format!("无法创建画廊目录: {}", directory.display()))?;

    Ok(Self {
      directory,
      visualizer: Visualizer::new(),
    })
  }

  fn snapshot_path(&self, record: &AnalysisRecord) -> PathBuf {
    self.directory.join(format!("analysis_{:04}.png", record.id))
  }

  fn sidecar_path(&self, record: &AnalysisRecord) -> PathBuf {
    self.directory.join(format!("analysis_{:04}.json", record.id))
  }
}

impl Render for GalleryOutput {
  fn render_record(&mut self, frame: &Frame, record: &AnalysisRecord) -> Result<()> {
    let mut snapshot = frame.image.clone();
    self.visualizer.draw_detections(&mut snapshot, &record.detections);

    let snapshot_path = self.snapshot_path(record);
    snapshot
      .save(&snapshot_path)
      .with_context(|| format!("无法保存快照: {}", snapshot_path.display()))?;

    let detections: Vec<_> = record
      .detections
      .iter()
      .map(|d| {
        json!({
          "species": d.species,
          "scientific_name": d.scientific_name,
          "habitat": d.habitat,
          "notes": d.notes,
          "confidence": d.confidence,
          "bbox": { "x": d.bbox.x, "y": d.bbox.y, "width": d.bbox.width, "height": d.bbox.height },
        })
      })
      .collect();

    let sidecar = json!({
      "id": record.id,
      "mode": record.mode.to_string(),
      "timestamp": record.timestamp.to_rfc3339(),
      "detections": detections,
    });

    let sidecar_path = self.sidecar_path(record);
    std::fs::write(&sidecar_path, serde_json::to_string_pretty(&sidecar)?)
      .with_context(|| format!("无法写入检测明细: {}", sidecar_path.display()))?;

    info!("记录 #{} 已写入画廊: {}", record.id, snapshot_path.display());
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use chrono::Utc;
  use image::RgbImage;

  use crate::detector::BoundingBox;
  use crate::history::{AnalysisMode, EnrichedDetection};

  use super::*;

  #[test]
  fn writes_snapshot_and_sidecar() {
    let dir = tempfile::tempdir().unwrap();
    let mut output = GalleryOutput::new(dir.path().join("gallery")).unwrap();

    let frame = Frame {
      image: RgbImage::new(64, 48),
      index: 0,
      timestamp_ms: 0,
    };
    let record = AnalysisRecord {
      id: 7,
      mode: AnalysisMode::Image,
      thumbnail: RgbImage::new(8, 6),
      detections: vec![EnrichedDetection {
        species: "Fish".to_string(),
        bbox: BoundingBox {
          x: 0.1,
          y: 0.1,
          width: 0.3,
          height: 0.3,
        },
        confidence: 0.77,
        scientific_name: Some("Actinopterygii"),
        habitat: None,
        notes: None,
      }],
      timestamp: Utc::now(),
    };

    output.render_record(&frame, &record).unwrap();

    let snapshot = dir.path().join("gallery/analysis_0007.png");
    let sidecar = dir.path().join("gallery/analysis_0007.json");
    assert!(snapshot.exists());

    let text = std::fs::read_to_string(sidecar).unwrap();
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value["id"], 7);
    assert_eq!(value["mode"], "image");
    assert_eq!(value["detections"][0]["species"], "Fish");
  }
}
