// 该文件是 Haishi （海市蜃楼） 项目的一部分。
// src/input/mod.rs - 输入源模块（采集协作方）
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

mod image_source;
#[cfg(feature = "v4l2")]
mod v4l2_source;
#[cfg(feature = "video")]
mod video_source;

use anyhow::Result;
use image::RgbImage;
use thiserror::Error;

use crate::history::AnalysisMode;

pub use image_source::ImageSource;
#[cfg(feature = "v4l2")]
pub use v4l2_source::V4l2Source;
#[cfg(feature = "video")]
pub use video_source::VideoSource;

/// 采集失败信号
///
/// 核心把“没有可用帧”当作无操作：不建记录、不动历史。
#[derive(Error, Debug)]
pub enum CaptureError {
  /// 输入源没有产出任何帧（权限被拒、媒体未就绪等）
  #[error("输入源没有可用帧")]
  NoFrame,
  /// 视频输入未编译进来
  #[error("视频输入未启用，请开启 video 特性")]
  VideoDisabled,
  /// V4L2 摄像头输入未编译进来
  #[error("V4L2 摄像头输入未启用，请开启 v4l2 特性")]
  CameraDisabled,
}

/// 帧数据
pub struct Frame {
  /// RGB 图像数据
  pub image: RgbImage,
  /// 帧索引
  pub index: u64,
  /// 时间戳（毫秒）
  pub timestamp_ms: u64,
}

/// 输入源类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputSourceType {
  /// 图片文件
  Image,
  /// 视频文件
  Video,
  /// V4L2 摄像头
  V4l2,
}

impl InputSourceType {
  /// 对应的分析模式
  pub fn analysis_mode(&self) -> AnalysisMode {
    match self {
      InputSourceType::Image => AnalysisMode::Image,
      InputSourceType::Video => AnalysisMode::Video,
      InputSourceType::V4l2 => AnalysisMode::Live,
    }
  }
}

/// 输入源 trait
pub trait InputSource: Iterator<Item = Result<Frame>> {
  /// 获取输入源类型
  fn source_type(&self) -> InputSourceType;

  /// 获取帧宽度
  fn width(&self) -> u32;

  /// 获取帧高度
  fn height(&self) -> u32;

  /// 获取帧率（如果适用）
  fn fps(&self) -> Option<f64>;
}

/// 判断路径是否指向图片文件
fn is_image_path(source: &str) -> bool {
  let lower = source.to_lowercase();
  lower.ends_with(".jpg")
    || lower.ends_with(".jpeg")
    || lower.ends_with(".png")
    || lower.ends_with(".bmp")
    || lower.ends_with(".gif")
    || lower.ends_with(".webp")
}

/// 判断路径是否指向 V4L2 设备
fn is_v4l2_path(source: &str) -> bool {
  source.starts_with("/dev/video") || source.starts_with("v4l2://")
}

/// 从路径创建输入源
pub fn create_input_source(source: &str) -> Result<Box<dyn InputSource>> {
  // 检查是否是 V4L2 设备
  if is_v4l2_path(source) {
    #[cfg(feature = "v4l2")]
    {
      let device_path = source.trim_start_matches("v4l2://");
      return Ok(Box::new(V4l2Source::new(device_path)?));
    }
    #[cfg(not(feature = "v4l2"))]
    return Err(CaptureError::CameraDisabled.into());
  }

  // 检查是否是图片文件
  if is_image_path(source) {
    return Ok(Box::new(ImageSource::new(source)?));
  }

  // 否则视为视频文件
  #[cfg(feature = "video")]
  return Ok(Box::new(VideoSource::new(source)?));
  #[cfg(not(feature = "video"))]
  Err(CaptureError::VideoDisabled.into())
}
