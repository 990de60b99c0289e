// 该文件是 Haishi （海市蜃楼） 项目的一部分。
// src/task.rs - 会话与分析任务
//
// 本文件根据 Apache 许可证第 2.0 版（以下简称“许可证”）授权使用；
// 除非遵守该许可证条款，否则您不得使用本文件。
// 您可通过以下网址获取许可证副本：
// http://www.apache.org/licenses/LICENSE-2.0
// 除非适用法律要求或书面同意，根据本许可协议分发的软件均按“原样”提供，
// 不附带任何形式的明示或暗示的保证或条件。
// 有关许可权限与限制的具体条款，请参阅本许可协议。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, Wareless Group

use std::time::Instant;

use anyhow::Result;
use tracing::{info, warn};

use crate::detector::Detector;
use crate::history::{AnalysisMode, HistoryStore, RecordBuilder};
use crate::input::{CaptureError, Frame};
use crate::output::Render;

/// 分析会话
///
/// 顶层控制器，持有记录构建器与历史仓库。会话与进程同生命周期，
/// 历史不落盘。单线程驱动：一个会话同一时刻只被一个任务通过
/// 可变引用推进，重叠的分析触发在这里无法表达。
#[derive(Default)]
pub struct Session {
  builder: RecordBuilder,
  history: HistoryStore,
}

impl Session {
  /// 创建一个空会话
  pub fn new() -> Self {
    Self::default()
  }

  /// 对一帧已采集的画面执行 检测 -> 构建 -> 入库 流水线
  ///
  /// 三步同步完成，中途不与其他分析交错；返回新记录的 id。
  pub fn analyze<D: Detector>(
    &mut self,
    mode: AnalysisMode,
    frame: &Frame,
    detector: &mut D,
  ) -> Result<u64> {
    let detections = detector.detect(&frame.image)?;
    info!("帧 {} 检测到 {} 个目标", frame.index, detections.len());

    let record = self.builder.build(mode, &frame.image, detections);
    let id = record.id;
    self.history.append(record);

    Ok(id)
  }

  /// 历史仓库的只读视图
  pub fn history(&self) -> &HistoryStore {
    &self.history
  }
}

/// 分析任务 trait
pub trait Task<I, D, O>: Sized {
  type Error;
  fn run_task(
    self,
    input: I,
    detector: &mut D,
    output: &mut O,
    session: &mut Session,
  ) -> Result<(), Self::Error>;
}

/// 单次分析任务：取一帧，做一次分析
///
/// 没有可用帧时以 CaptureError::NoFrame 报告，不动历史。
pub struct OneShotTask {
  mode: AnalysisMode,
}

impl OneShotTask {
  pub fn new(mode: AnalysisMode) -> Self {
    Self { mode }
  }
}

impl<I, D, O> Task<I, D, O> for OneShotTask
where
  I: Iterator<Item = Result<Frame>>,
  D: Detector,
  O: Render,
{
  type Error = anyhow::Error;

  fn run_task(
    self,
    mut input: I,
    detector: &mut D,
    output: &mut O,
    session: &mut Session,
  ) -> Result<(), Self::Error> {
    info!("开始分析任务...");
    let frame = input.next().ok_or(CaptureError::NoFrame)??;

    let now = Instant::now();
    let id = session.analyze(self.mode, &frame, detector)?;
    info!("分析 #{} 完成，耗时: {:.2?}", id, now.elapsed());

    if let Some(record) = session.history().latest() {
      output.render_record(&frame, record)?;
    }

    Ok(())
  }
}

/// 连续分析任务：对每帧做一次分析（视频 / 实时演示）
///
/// 可用帧数上限约束，也可 Ctrl-C 中断。
#[derive(Debug)]
pub struct ContinuousTask {
  mode: AnalysisMode,
  frame_number: Option<usize>,
}

impl ContinuousTask {
  pub fn new(mode: AnalysisMode) -> Self {
    Self {
      mode,
      frame_number: None,
    }
  }

  pub fn with_frame_number(mut self, frame_number: Option<usize>) -> Self {
    self.frame_number = frame_number;
    self
  }
}

impl<I, D, O> Task<I, D, O> for ContinuousTask
where
  I: Iterator<Item = Result<Frame>>,
  D: Detector,
  O: Render,
{
  type Error = anyhow::Error;

  fn run_task(
    self,
    input: I,
    detector: &mut D,
    output: &mut O,
    session: &mut Session,
  ) -> Result<(), Self::Error> {
    info!("开始连续分析任务...");
    let (tx, rx) = std::sync::mpsc::channel();

    if let Err(e) = ctrlc::set_handler(move || {
      info!("收到中断信号，准备退出...");
      let _ = tx.send(());
    }) {
      warn!("无法注册 Ctrl-C 处理器: {}", e);
    }

    let mut analyzed = 0usize;
    for frame in input {
      let frame = frame?;

      let now = Instant::now();
      let id = session.analyze(self.mode, &frame, detector)?;
      if let Some(record) = session.history().latest() {
        output.render_record(&frame, record)?;
      }
      info!("分析 #{} 完成，耗时: {:.2?}", id, now.elapsed());

      analyzed += 1;
      if self.frame_number.map(|n| analyzed >= n).unwrap_or(false) {
        info!("达到指定帧数 {}, 退出任务循环", analyzed);
        break;
      }
      if rx.try_recv().is_ok() {
        warn!("中断信号接收，退出任务循环");
        break;
      }
    }

    info!("连续分析结束，共 {} 次", analyzed);
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use image::RgbImage;

  use crate::detector::RandomDetector;
  use crate::output::NullOutput;

  use super::*;

  fn frames(count: usize) -> Vec<Result<Frame>> {
    (0..count)
      .map(|i| {
        Ok(Frame {
          image: RgbImage::new(64, 48),
          index: i as u64,
          timestamp_ms: i as u64 * 33,
        })
      })
      .collect()
  }

  #[test]
  fn one_shot_appends_single_record() {
    let mut session = Session::new();
    let mut detector = RandomDetector::with_seed(1);
    let mut output = NullOutput;

    OneShotTask::new(AnalysisMode::Image)
      .run_task(frames(1).into_iter(), &mut detector, &mut output, &mut session)
      .unwrap();

    assert_eq!(session.history().len(), 1);
    let record = session.history().latest().unwrap();
    assert_eq!(record.mode, AnalysisMode::Image);
    assert!(!record.detections.is_empty());
  }

  #[test]
  fn one_shot_without_frame_leaves_history_untouched() {
    let mut session = Session::new();
    let mut detector = RandomDetector::with_seed(2);
    let mut output = NullOutput;

    let err = OneShotTask::new(AnalysisMode::Live)
      .run_task(frames(0).into_iter(), &mut detector, &mut output, &mut session)
      .unwrap_err();

    assert!(matches!(
      err.downcast_ref::<CaptureError>(),
      Some(CaptureError::NoFrame)
    ));
    assert!(session.history().is_empty());
  }

  #[test]
  fn continuous_honors_frame_budget() {
    let mut session = Session::new();
    let mut detector = RandomDetector::with_seed(3);
    let mut output = NullOutput;

    ContinuousTask::new(AnalysisMode::Video)
      .with_frame_number(Some(3))
      .run_task(frames(10).into_iter(), &mut detector, &mut output, &mut session)
      .unwrap();

    assert_eq!(session.history().len(), 3);
    assert!(session.history().all().all(|r| r.mode == AnalysisMode::Video));
  }

  #[test]
  fn records_appear_newest_first_across_analyses() {
    let mut session = Session::new();
    let mut detector = RandomDetector::with_seed(4);

    let frame = Frame {
      image: RgbImage::new(32, 32),
      index: 0,
      timestamp_ms: 0,
    };

    let first = session.analyze(AnalysisMode::Image, &frame, &mut detector).unwrap();
    let second = session.analyze(AnalysisMode::Video, &frame, &mut detector).unwrap();

    assert!(second > first);
    let ids: Vec<u64> = session.history().all().map(|r| r.id).collect();
    assert_eq!(ids, vec![second, first]);
  }
}
