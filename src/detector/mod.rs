// 该文件是 Haishi （海市蜃楼） 项目的一部分。
// src/detector/mod.rs - 检测器模块
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

mod random;

use anyhow::Result;
use image::RgbImage;

pub use random::RandomDetector;

/// 归一化边界框
///
/// 所有坐标相对帧尺寸归一化到 [0, 1]；约定 `x + width <= 1`、
/// `y + height <= 1`，即边界框完整落在帧内。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
  /// 左上角 x 坐标
  pub x: f32,
  /// 左上角 y 坐标
  pub y: f32,
  /// 宽度
  pub width: f32,
  /// 高度
  pub height: f32,
}

/// 单个检测结果
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
  /// 物种常用名
  pub species: String,
  /// 归一化边界框
  pub bbox: BoundingBox,
  /// 置信度 (0, 1]
  pub confidence: f32,
}

/// 检测器 trait
///
/// 这是接入真实推理后端的接口缝：约定输出数量有界、边界框归一化
/// 且落在帧内、置信度有界。替换成真模型时下游组件无需改动。
pub trait Detector {
  /// 对一帧图像运行检测
  fn detect(&mut self, image: &RgbImage) -> Result<Vec<Detection>>;
}
