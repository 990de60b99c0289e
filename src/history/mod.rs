// 该文件是 Haishi （海市蜃楼） 项目的一部分。
// src/history/mod.rs - 会话历史模块
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

mod record;
mod store;

use chrono::{DateTime, Utc};
use image::RgbImage;

use crate::detector::BoundingBox;

pub use record::RecordBuilder;
pub use store::{HistoryStore, Statistics};

/// 分析模式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisMode {
  /// 图片文件
  Image,
  /// 视频文件
  Video,
  /// 实时摄像头
  Live,
}

impl std::fmt::Display for AnalysisMode {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      AnalysisMode::Image => write!(f, "image"),
      AnalysisMode::Video => write!(f, "video"),
      AnalysisMode::Live => write!(f, "live"),
    }
  }
}

/// 富化后的检测结果
///
/// 检测与知识库元数据在构建时刻的合并快照；之后对知识库的任何
/// 修改都不会回写到已存储的历史记录中。
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedDetection {
  /// 物种常用名
  pub species: String,
  /// 归一化边界框
  pub bbox: BoundingBox,
  /// 置信度 (0, 1]
  pub confidence: f32,
  /// 学名（知识库未命中时为 None）
  pub scientific_name: Option<&'static str>,
  /// 栖息地描述
  pub habitat: Option<&'static str>,
  /// 备注
  pub notes: Option<&'static str>,
}

/// 一次完成的分析记录
///
/// 每次成功的分析动作恰好创建一条记录，创建后不可变，
/// 由历史仓库独占持有。
#[derive(Debug, Clone)]
pub struct AnalysisRecord {
  /// 会话内唯一且单调递增的标识
  pub id: u64,
  /// 分析模式
  pub mode: AnalysisMode,
  /// 缩略图（对核心逻辑而言是不透明的图像数据）
  pub thumbnail: RgbImage,
  /// 富化后的检测序列
  pub detections: Vec<EnrichedDetection>,
  /// 构建时刻（ISO-8601 经 RFC 3339 呈现）
  pub timestamp: DateTime<Utc>,
}

impl AnalysisRecord {
  /// 本条记录的平均置信度；无检测时为 0
  pub fn mean_confidence(&self) -> f32 {
    if self.detections.is_empty() {
      return 0.0;
    }
    let sum: f32 = self.detections.iter().map(|d| d.confidence).sum();
    sum / self.detections.len() as f32
  }
}
