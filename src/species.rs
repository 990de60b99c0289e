// 该文件是 Haishi （海市蜃楼） 项目的一部分。
// src/species.rs - 海洋物种知识库
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

/// 单个物种的静态知识条目
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpeciesInfo {
  /// 常用名（知识库主键）
  pub common_name: &'static str,
  /// 学名
  pub scientific_name: &'static str,
  /// 栖息地描述
  pub habitat: &'static str,
  /// 备注（行为、生态等）
  pub notes: &'static str,
}

/// 海洋物种知识库
///
/// 只读数据，构建期固定；检测生成器从这里取合法的物种标签，
/// 记录构建器用它来补全学名、栖息地等元数据。
pub const SPECIES_KNOWLEDGE: [SpeciesInfo; 4] = [
  SpeciesInfo {
    common_name: "Jellyfish",
    scientific_name: "Scyphozoa",
    habitat: "Open ocean and coastal waters; often near the surface.",
    notes: "Gelatinous zooplankton drifting with currents; some species can bloom seasonally.",
  },
  SpeciesInfo {
    common_name: "Fish",
    scientific_name: "Actinopterygii",
    habitat: "Varied: reefs, pelagic zones, and coastal areas depending on species.",
    notes: "Cold-blooded vertebrates with gills; incredible diversity across oceans.",
  },
  SpeciesInfo {
    common_name: "Sea Turtle",
    scientific_name: "Chelonioidea",
    habitat: "Tropical and subtropical oceans; forage in seagrass beds and coral reefs.",
    notes: "Long-lived reptiles migrating vast distances between feeding and nesting grounds.",
  },
  SpeciesInfo {
    common_name: "Octopus",
    scientific_name: "Octopoda",
    habitat: "Rocky reefs, seafloor crevices, and kelp forests from shallow to deep waters.",
    notes: "Highly intelligent cephalopods with remarkable camouflage capabilities.",
  },
];

/// 按常用名查询物种条目
pub fn lookup(common_name: &str) -> Option<&'static SpeciesInfo> {
  SPECIES_KNOWLEDGE
    .iter()
    .find(|info| info.common_name == common_name)
}

/// 物种在知识库中的序号（用于稳定的可视化配色）
pub fn species_index(common_name: &str) -> Option<usize> {
  SPECIES_KNOWLEDGE
    .iter()
    .position(|info| info.common_name == common_name)
}
