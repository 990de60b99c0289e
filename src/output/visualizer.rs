// 该文件是 Haishi （海市蜃楼） 项目的一部分。
// src/output/visualizer.rs - 可视化模块
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use image::{Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;

use crate::history::EnrichedDetection;
use crate::species::{self, SPECIES_KNOWLEDGE};

/// 知识库之外物种的回退颜色
const UNKNOWN_COLOR: Rgb<u8> = Rgb([220, 220, 220]);

/// 可视化工具
///
/// 把归一化边界框缩放到像素坐标并画到帧上；
/// 物种标签文本由控制台报告承担，这里只画框。
pub struct Visualizer {
  /// 按知识库序号排列的边界框颜色
  colors: Vec<Rgb<u8>>,
}

impl Default for Visualizer {
  fn default() -> Self {
    Self::new()
  }
}

impl Visualizer {
  /// 创建一个新的可视化工具
  pub fn new() -> Self {
    // 为知识库里的每个物种生成一种稳定颜色
    let colors: Vec<Rgb<u8>> = (0..SPECIES_KNOWLEDGE.len())
      .map(|i| {
        let hue = (i as f32 / SPECIES_KNOWLEDGE.len() as f32) * 360.0;
        Self::hsv_to_rgb(hue, 0.8, 0.9)
      })
      .collect();

    Self { colors }
  }

  /// HSV 转 RGB
  fn hsv_to_rgb(h: f32, s: f32, v: f32) -> Rgb<u8> {
    let c = v * s;
    let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
    let m = v - c;

    let (r, g, b) = if h < 60.0 {
      (c, x, 0.0)
    } else if h < 120.0 {
      (x, c, 0.0)
    } else if h < 180.0 {
      (0.0, c, x)
    } else if h < 240.0 {
      (0.0, x, c)
    } else if h < 300.0 {
      (x, 0.0, c)
    } else {
      (c, 0.0, x)
    };

    Rgb([
      ((r + m) * 255.0) as u8,
      ((g + m) * 255.0) as u8,
      ((b + m) * 255.0) as u8,
    ])
  }

  /// 物种对应的边界框颜色
  fn color_for(&self, species: &str) -> Rgb<u8> {
    species::species_index(species)
      .map(|idx| self.colors[idx])
      .unwrap_or(UNKNOWN_COLOR)
  }

  /// 在图像上绘制检测结果
  pub fn draw_detections(&self, image: &mut RgbImage, detections: &[EnrichedDetection]) {
    let frame_w = image.width() as f32;
    let frame_h = image.height() as f32;

    for detection in detections {
      let color = self.color_for(&detection.species);

      // 归一化坐标缩放到像素
      let x = (detection.bbox.x * frame_w).round() as i32;
      let y = (detection.bbox.y * frame_h).round() as i32;
      let width = (detection.bbox.width * frame_w).round() as u32;
      let height = (detection.bbox.height * frame_h).round() as u32;

      if width > 0 && height > 0 {
        let rect = Rect::at(x, y).of_size(width, height);
        draw_hollow_rect_mut(image, rect, color);

        // 绘制第二个边框以增加可见度；收缩后尺寸为零时跳过
        if x > 0 && y > 0 && width > 2 && height > 2 {
          let inner_rect = Rect::at(x + 1, y + 1).of_size(width - 2, height - 2);
          draw_hollow_rect_mut(image, inner_rect, color);
        }
      }
    }
  }
}
