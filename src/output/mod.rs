// 该文件是 Haishi （海市蜃楼） 项目的一部分。
// src/output/mod.rs - 输出模块（呈现协作方）
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

mod gallery_output;
mod visualizer;

use anyhow::Result;

use crate::history::AnalysisRecord;
use crate::input::Frame;

pub use gallery_output::GalleryOutput;
pub use visualizer::Visualizer;

/// 渲染 trait
///
/// 呈现侧只拿到记录的只读引用；历史仓库的内容不经这里改动。
pub trait Render {
  /// 渲染一条分析记录及其来源帧
  fn render_record(&mut self, frame: &Frame, record: &AnalysisRecord) -> Result<()>;
}

/// 空输出（不落盘时使用）
pub struct NullOutput;

impl Render for NullOutput {
  fn render_record(&mut self, _frame: &Frame, _record: &AnalysisRecord) -> Result<()> {
    Ok(())
  }
}

impl<R: Render + ?Sized> Render for Box<R> {
  fn render_record(&mut self, frame: &Frame, record: &AnalysisRecord) -> Result<()> {
    (**self).render_record(frame, record)
  }
}
