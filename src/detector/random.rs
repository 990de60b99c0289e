// 该文件是 Haishi （海市蜃楼） 项目的一部分。
// src/detector/random.rs - 随机检测器（推理占位）
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use anyhow::Result;
use image::RgbImage;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::species::SPECIES_KNOWLEDGE;

use super::{BoundingBox, Detection, Detector};

/// 每次检测最多产生的目标数
const MAX_DETECTIONS: usize = 3;
/// 边界框最小边长（归一化）
const MIN_BOX_SIZE: f32 = 0.15;
/// 边界框最大边长（归一化，不含）
const MAX_BOX_SIZE: f32 = 0.55;
/// 置信度下界
const MIN_CONFIDENCE: f32 = 0.3;
/// 置信度上界（不含）
const MAX_CONFIDENCE: f32 = 0.9;

/// 随机检测器
///
/// 在后端接入之前充当推理引擎的占位：每次调用随机产生 1 到 3 个
/// 检测，物种从知识库中均匀抽取，边界框保证完整落在帧内。
pub struct RandomDetector {
  rng: StdRng,
}

impl Default for RandomDetector {
  fn default() -> Self {
    Self::new()
  }
}

impl RandomDetector {
  /// 创建一个熵种子的随机检测器
  pub fn new() -> Self {
    Self {
      rng: StdRng::from_entropy(),
    }
  }

  /// 创建一个固定种子的随机检测器（可复现演示与测试）
  pub fn with_seed(seed: u64) -> Self {
    Self {
      rng: StdRng::seed_from_u64(seed),
    }
  }

  fn random_detection(&mut self) -> Detection {
    let info = &SPECIES_KNOWLEDGE[self.rng.gen_range(0..SPECIES_KNOWLEDGE.len())];

    // 最小边长兜底，保证边界框可见
    let width = self.rng.gen_range(0.0..MAX_BOX_SIZE).max(MIN_BOX_SIZE);
    let height = self.rng.gen_range(0.0..MAX_BOX_SIZE).max(MIN_BOX_SIZE);
    let x = self.rng.gen_range(0.0..(1.0 - width));
    let y = self.rng.gen_range(0.0..(1.0 - height));

    // 置信度保留两位小数
    let confidence =
      (self.rng.gen_range(MIN_CONFIDENCE..MAX_CONFIDENCE) * 100.0).round() / 100.0;

    Detection {
      species: info.common_name.to_string(),
      bbox: BoundingBox {
        x,
        y,
        width,
        height,
      },
      confidence,
    }
  }
}

impl Detector for RandomDetector {
  fn detect(&mut self, image: &RgbImage) -> Result<Vec<Detection>> {
    debug!("对 {}x{} 帧生成随机检测", image.width(), image.height());

    let count = self.rng.gen_range(1..=MAX_DETECTIONS);
    let detections = (0..count).map(|_| self.random_detection()).collect();

    Ok(detections)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::species;

  #[test]
  fn detection_count_in_bounds() {
    let mut detector = RandomDetector::with_seed(7);
    let image = RgbImage::new(640, 480);

    for _ in 0..200 {
      let detections = detector.detect(&image).unwrap();
      assert!(!detections.is_empty());
      assert!(detections.len() <= MAX_DETECTIONS);
    }
  }

  #[test]
  fn boxes_stay_inside_frame() {
    let mut detector = RandomDetector::with_seed(42);
    let image = RgbImage::new(1280, 720);

    for _ in 0..500 {
      for det in detector.detect(&image).unwrap() {
        let b = det.bbox;
        assert!(b.x >= 0.0 && b.y >= 0.0);
        assert!(b.width >= MIN_BOX_SIZE && b.height >= MIN_BOX_SIZE);
        assert!(b.x + b.width <= 1.0, "x+width = {}", b.x + b.width);
        assert!(b.y + b.height <= 1.0, "y+height = {}", b.y + b.height);
      }
    }
  }

  #[test]
  fn confidence_bounded_and_rounded() {
    let mut detector = RandomDetector::with_seed(99);
    let image = RgbImage::new(320, 240);

    for _ in 0..500 {
      for det in detector.detect(&image).unwrap() {
        assert!(det.confidence > 0.0 && det.confidence <= 1.0);
        assert!(det.confidence >= MIN_CONFIDENCE && det.confidence <= MAX_CONFIDENCE);
        // 两位小数
        let scaled = det.confidence * 100.0;
        assert!((scaled - scaled.round()).abs() < 1e-4);
      }
    }
  }

  #[test]
  fn species_come_from_knowledge_base() {
    let mut detector = RandomDetector::with_seed(3);
    let image = RgbImage::new(100, 100);

    for _ in 0..200 {
      for det in detector.detect(&image).unwrap() {
        assert!(species::lookup(&det.species).is_some(), "未知物种: {}", det.species);
      }
    }
  }

  #[test]
  fn seeded_detector_is_reproducible() {
    let image = RgbImage::new(640, 480);
    let a = RandomDetector::with_seed(11).detect(&image).unwrap();
    let b = RandomDetector::with_seed(11).detect(&image).unwrap();
    assert_eq!(a, b);
  }
}
