// 该文件是 Haishi （海市蜃楼） 项目的一部分。
// src/history/record.rs - 分析记录构建器
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use chrono::Utc;
use image::RgbImage;
use tracing::warn;

use crate::detector::{BoundingBox, Detection};
use crate::species;

use super::{AnalysisMode, AnalysisRecord, EnrichedDetection};

/// 缩略图最大宽度
const THUMBNAIL_WIDTH: u32 = 320;
/// 缩略图最大高度
const THUMBNAIL_HEIGHT: u32 = 180;

/// 分析记录构建器
///
/// 持有会话内的 id 计数器；对每个检测做知识库富化，盖上时间戳，
/// 组装成不可变的历史记录。不触碰历史仓库。
pub struct RecordBuilder {
  next_id: u64,
}

impl Default for RecordBuilder {
  fn default() -> Self {
    Self::new()
  }
}

impl RecordBuilder {
  /// 创建一个新的记录构建器，id 从 1 开始
  pub fn new() -> Self {
    Self { next_id: 1 }
  }

  /// 用一帧已采集的静止图像和检测结果构建分析记录
  ///
  /// 知识库未命中的物种降级为空元数据而不是失败；
  /// 越界的边界框在入库前被夹取回帧内。
  pub fn build(
    &mut self,
    mode: AnalysisMode,
    frame: &RgbImage,
    detections: Vec<Detection>,
  ) -> AnalysisRecord {
    let id = self.next_id;
    self.next_id += 1;

    let detections = detections.into_iter().map(enrich).collect();
    let thumbnail = make_thumbnail(frame);

    AnalysisRecord {
      id,
      mode,
      thumbnail,
      detections,
      timestamp: Utc::now(),
    }
  }
}

/// 生成等比缩略图，只缩不放
fn make_thumbnail(frame: &RgbImage) -> RgbImage {
  let scale = (THUMBNAIL_WIDTH as f32 / frame.width() as f32)
    .min(THUMBNAIL_HEIGHT as f32 / frame.height() as f32)
    .min(1.0);
  let width = ((frame.width() as f32 * scale).round() as u32).max(1);
  let height = ((frame.height() as f32 * scale).round() as u32).max(1);
  image::imageops::thumbnail(frame, width, height)
}

/// 将单个检测与知识库合并为富化检测
fn enrich(detection: Detection) -> EnrichedDetection {
  let info = species::lookup(&detection.species);
  if info.is_none() {
    warn!("知识库未收录物种 {}，以空元数据入库", detection.species);
  }

  EnrichedDetection {
    bbox: clamp_bbox(detection.bbox),
    confidence: detection.confidence.clamp(0.0, 1.0),
    species: detection.species,
    scientific_name: info.map(|i| i.scientific_name),
    habitat: info.map(|i| i.habitat),
    notes: info.map(|i| i.notes),
  }
}

/// 将边界框夹取到 [0,1]×[0,1] 帧内
fn clamp_bbox(bbox: BoundingBox) -> BoundingBox {
  let x = bbox.x.clamp(0.0, 1.0);
  let y = bbox.y.clamp(0.0, 1.0);
  BoundingBox {
    x,
    y,
    width: bbox.width.clamp(0.0, 1.0 - x),
    height: bbox.height.clamp(0.0, 1.0 - y),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn detection(species: &str, confidence: f32) -> Detection {
    Detection {
      species: species.to_string(),
      bbox: BoundingBox {
        x: 0.1,
        y: 0.2,
        width: 0.3,
        height: 0.4,
      },
      confidence,
    }
  }

  #[test]
  fn build_preserves_count_and_species() {
    let mut builder = RecordBuilder::new();
    let frame = RgbImage::new(640, 480);

    let record = builder.build(
      AnalysisMode::Image,
      &frame,
      vec![detection("Jellyfish", 0.8), detection("Octopus", 0.5)],
    );

    assert_eq!(record.detections.len(), 2);
    assert_eq!(record.detections[0].species, "Jellyfish");
    assert_eq!(record.detections[1].species, "Octopus");
    assert_eq!(record.detections[0].scientific_name, Some("Scyphozoa"));
    assert!(record.detections[1].habitat.is_some());
    assert!(record.detections[1].notes.is_some());
  }

  #[test]
  fn unknown_species_degrades_to_empty_metadata() {
    let mut builder = RecordBuilder::new();
    let frame = RgbImage::new(640, 480);

    let record = builder.build(AnalysisMode::Video, &frame, vec![detection("Kraken", 0.6)]);

    assert_eq!(record.detections.len(), 1);
    assert_eq!(record.detections[0].species, "Kraken");
    assert_eq!(record.detections[0].scientific_name, None);
    assert_eq!(record.detections[0].habitat, None);
    assert_eq!(record.detections[0].notes, None);
  }

  #[test]
  fn ids_are_monotonic() {
    let mut builder = RecordBuilder::new();
    let frame = RgbImage::new(64, 64);

    let a = builder.build(AnalysisMode::Image, &frame, vec![]);
    let b = builder.build(AnalysisMode::Live, &frame, vec![]);
    let c = builder.build(AnalysisMode::Video, &frame, vec![]);

    assert_eq!(a.id, 1);
    assert_eq!(b.id, 2);
    assert_eq!(c.id, 3);
  }

  #[test]
  fn malformed_geometry_is_clamped() {
    let mut builder = RecordBuilder::new();
    let frame = RgbImage::new(64, 64);

    let bad = Detection {
      species: "Fish".to_string(),
      bbox: BoundingBox {
        x: 0.9,
        y: -0.5,
        width: 0.8,
        height: 1.7,
      },
      confidence: 1.4,
    };

    let record = builder.build(AnalysisMode::Image, &frame, vec![bad]);
    let det = &record.detections[0];

    assert!(det.bbox.x >= 0.0 && det.bbox.y >= 0.0);
    assert!(det.bbox.x + det.bbox.width <= 1.0);
    assert!(det.bbox.y + det.bbox.height <= 1.0);
    assert!(det.confidence <= 1.0);
  }

  #[test]
  fn zero_detection_record_builds() {
    let mut builder = RecordBuilder::new();
    let frame = RgbImage::new(64, 64);

    let record = builder.build(AnalysisMode::Live, &frame, vec![]);
    assert!(record.detections.is_empty());
    assert_eq!(record.mean_confidence(), 0.0);
  }

  #[test]
  fn thumbnail_is_downscaled() {
    let mut builder = RecordBuilder::new();
    let frame = RgbImage::new(1280, 720);

    let record = builder.build(AnalysisMode::Image, &frame, vec![]);
    assert!(record.thumbnail.width() <= THUMBNAIL_WIDTH);
    assert!(record.thumbnail.height() <= THUMBNAIL_HEIGHT);
  }
}
