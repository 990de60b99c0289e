// 该文件是 Haishi （海市蜃楼） 项目的一部分。
// src/history/store.rs - 历史仓库与统计
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use std::collections::{HashSet, VecDeque};

use super::{AnalysisMode, AnalysisRecord};

/// 会话统计
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Statistics {
  /// 分析总数
  pub total_analyses: usize,
  /// 历史中出现过的不同物种数
  pub unique_species: usize,
  /// 平均置信度百分比（取整）
  pub average_confidence_percent: u32,
  /// 图片分析数
  pub image_count: usize,
  /// 非图片分析数（视频与实时合计）
  pub other_mode_count: usize,
}

/// 会话历史仓库
///
/// 有序、只前插的分析记录序列（最新在前）。会话开始时为空，
/// 生命周期内只增不删、不改、不重排，随会话一起丢弃。
#[derive(Debug, Default)]
pub struct HistoryStore {
  records: VecDeque<AnalysisRecord>,
}

impl HistoryStore {
  /// 创建一个空的历史仓库
  pub fn new() -> Self {
    Self::default()
  }

  /// 前插一条记录（最新在前），不拒绝任何结构完整的记录
  pub fn append(&mut self, record: AnalysisRecord) {
    self.records.push_front(record);
  }

  /// 只读遍历全部记录，最新在前
  pub fn all(&self) -> impl Iterator<Item = &AnalysisRecord> {
    self.records.iter()
  }

  /// 最新一条记录
  pub fn latest(&self) -> Option<&AnalysisRecord> {
    self.records.front()
  }

  /// 记录条数
  pub fn len(&self) -> usize {
    self.records.len()
  }

  /// 是否为空
  pub fn is_empty(&self) -> bool {
    self.records.is_empty()
  }

  /// 基于当前内容即时计算统计
  ///
  /// 平均置信度是“先逐条求均值、再跨记录求均值”的两层平均：
  /// 每条记录不论检测多少都等权计入，无检测的记录按 0 计。
  pub fn statistics(&self) -> Statistics {
    let total_analyses = self.records.len();

    let unique_species = self
      .records
      .iter()
      .flat_map(|r| r.detections.iter())
      .map(|d| d.species.as_str())
      .collect::<HashSet<_>>()
      .len();

    let average_confidence_percent = if self.records.is_empty() {
      0
    } else {
      let sum: f32 = self.records.iter().map(|r| r.mean_confidence()).sum();
      (sum / total_analyses as f32 * 100.0).round() as u32
    };

    let image_count = self
      .records
      .iter()
      .filter(|r| r.mode == AnalysisMode::Image)
      .count();

    Statistics {
      total_analyses,
      unique_species,
      average_confidence_percent,
      image_count,
      other_mode_count: total_analyses - image_count,
    }
  }
}
