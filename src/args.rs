// 该文件是 Haishi （海市蜃楼） 项目的一部分。
// src/args.rs - 项目参数配置
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use clap::Parser;

/// Haishi 项目参数配置
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 输入来源（可多次指定，每个来源分析一次）
  /// 支持格式:
  /// - 图片: *.jpg, *.jpeg, *.png, *.bmp, *.gif, *.webp
  /// - 视频: *.mp4, *.avi, *.mkv 等（需 video 特性）
  /// - V4L2: /dev/video0 或 v4l2:///dev/video0（需 v4l2 特性）
  #[arg(long, value_name = "SOURCE", required = true)]
  pub input: Vec<String>,

  /// 画廊输出目录；每条记录落一张带框快照和一份检测明细
  /// （不指定则只在控制台报告）
  #[arg(long, value_name = "DIR")]
  pub gallery: Option<String>,

  /// 视频/摄像头来源连续分析的帧数（图片始终只分析一帧）
  #[arg(long, default_value = "1", value_name = "COUNT")]
  pub max_frames: usize,

  /// 随机种子（固定后检测结果可复现）
  #[arg(long, value_name = "SEED")]
  pub seed: Option<u64>,
}
