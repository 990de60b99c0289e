// 该文件是 Haishi （海市蜃楼） 项目的一部分。
// src/main.rs - 项目主程序
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

mod args;

use anyhow::Result;
use clap::Parser;

use haishi::detector::RandomDetector;
use haishi::history::AnalysisMode;
use haishi::input::{CaptureError, InputSourceType, create_input_source};
use haishi::output::{GalleryOutput, NullOutput, Render};
use haishi::task::{ContinuousTask, OneShotTask, Session, Task};

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = args::Args::parse();

  println!("Haishi 海洋物种检测演示");
  println!("======================");
  println!("输入来源: {}", args.input.join(", "));
  println!(
    "画廊目录: {}",
    args.gallery.as_deref().unwrap_or("(不落盘)")
  );
  println!();

  // 创建检测器（后端接入前的推理占位）
  let mut detector = match args.seed {
    Some(seed) => RandomDetector::with_seed(seed),
    None => RandomDetector::new(),
  };

  // 创建画廊输出
  let mut output: Box<dyn Render> = match &args.gallery {
    Some(dir) => Box::new(GalleryOutput::new(dir)?),
    None => Box::new(NullOutput),
  };

  let mut session = Session::new();

  for source in &args.input {
    println!("正在打开输入源: {}", source);
    let input_source = match create_input_source(source) {
      Ok(input_source) => input_source,
      Err(e) => {
        // 单个来源失败不致命，会话继续
        println!("打开失败，跳过: {:#}", e);
        continue;
      }
    };

    println!(
      "输入源已打开: {}x{} {}",
      input_source.width(),
      input_source.height(),
      match input_source.source_type() {
        InputSourceType::Image => "图片",
        InputSourceType::Video => "视频",
        InputSourceType::V4l2 => "V4L2 摄像头",
      }
    );

    let mode = input_source.source_type().analysis_mode();
    let result = if mode == AnalysisMode::Image || args.max_frames <= 1 {
      OneShotTask::new(mode).run_task(input_source, &mut detector, &mut output, &mut session)
    } else {
      ContinuousTask::new(mode)
        .with_frame_number(Some(args.max_frames))
        .run_task(input_source, &mut detector, &mut output, &mut session)
    };

    if let Err(e) = result {
      match e.downcast_ref::<CaptureError>() {
        Some(CaptureError::NoFrame) => println!("来源没有可用帧，未产生记录"),
        _ => println!("分析失败，跳过: {:#}", e),
      }
    }
  }

  // 历史画廊
  println!();
  println!("历史记录（最新在前）");
  println!("====================");
  if session.history().is_empty() {
    println!("暂无检测记录。");
  }
  for record in session.history().all() {
    println!(
      "[#{}] {} 模式: {} 缩略图: {}x{}",
      record.id,
      record.timestamp.to_rfc3339(),
      record.mode,
      record.thumbnail.width(),
      record.thumbnail.height()
    );
    for det in &record.detections {
      println!(
        "  - {} ({}): {:.0}%",
        det.species,
        det.scientific_name.unwrap_or("unknown"),
        det.confidence * 100.0
      );
      println!("    栖息地: {}", det.habitat.unwrap_or("-"));
      println!("    备注: {}", det.notes.unwrap_or("-"));
    }
  }

  // 会话统计
  let stats = session.history().statistics();
  println!();
  println!("会话统计");
  println!("========");
  println!("分析总数: {}", stats.total_analyses);
  println!("独特物种: {}", stats.unique_species);
  println!("平均置信度: {}%", stats.average_confidence_percent);
  println!(
    "图片 / 视频与实时: {} / {}",
    stats.image_count, stats.other_mode_count
  );

  Ok(())
}
