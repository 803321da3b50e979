//! PointResult - 分类点云结果

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// 每点字节数: x, y, z (little-endian f32)
pub const POINT_STRIDE: usize = 12;

/// 点云结果: 单帧的分类点云集合
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointResult {
    /// 帧时间戳 (unix seconds, f64)
    pub timestamp: f64,

    /// 分类点云
    #[serde(default)]
    pub clouds: Vec<PointCloud>,
}

impl PointResult {
    /// 所有点云的总点数
    pub fn total_points(&self) -> usize {
        self.clouds.iter().map(PointCloud::num_points).sum()
    }
}

/// 单个分类点云
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointCloud {
    /// 上游点云 ID (传感器或分组序号)
    pub id: u32,

    /// 点云的分类
    pub kind: PointCloudKind,

    /// 打包的 x,y,z f32 三元组，每点 `POINT_STRIDE` 字节
    pub points: Bytes,

    /// 每点反射强度 (packed f32)，可为空
    #[serde(default)]
    pub intensities: Bytes,
}

/// 上游产生的点分类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointCloudKind {
    /// 未过滤的输入点
    Raw,
    /// 被分类为地面的点
    Ground,
    /// 匹配背景模型的点
    Background,
}

impl PointCloud {
    /// 打包点数
    pub fn num_points(&self) -> usize {
        self.points.len() / POINT_STRIDE
    }

    /// 按序遍历打包的位置，不复制缓冲区。
    ///
    /// 末尾不完整的点 (截断缓冲区) 被忽略。
    pub fn positions(&self) -> impl Iterator<Item = [f32; 3]> + '_ {
        self.points.chunks_exact(POINT_STRIDE).map(|point| {
            let mut xyz = [0.0f32; 3];
            for (value, raw) in xyz.iter_mut().zip(point.chunks_exact(4)) {
                *value = f32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]);
            }
            xyz
        })
    }

    /// 遍历打包的强度值
    pub fn intensity_values(&self) -> impl Iterator<Item = f32> + '_ {
        self.intensities
            .chunks_exact(4)
            .map(|raw| f32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pack(values: &[f32]) -> Bytes {
        values
            .iter()
            .flat_map(|v| v.to_le_bytes())
            .collect::<Vec<u8>>()
            .into()
    }

    #[test]
    fn positions_unpack_in_order() {
        let cloud = PointCloud {
            id: 0,
            kind: PointCloudKind::Raw,
            points: pack(&[1.0, 2.0, 3.0, -4.0, 0.5, 9.0]),
            intensities: pack(&[0.1, 0.9]),
        };

        assert_eq!(cloud.num_points(), 2);
        let positions: Vec<[f32; 3]> = cloud.positions().collect();
        assert_eq!(positions, vec![[1.0, 2.0, 3.0], [-4.0, 0.5, 9.0]]);

        let intensities: Vec<f32> = cloud.intensity_values().collect();
        assert_eq!(intensities, vec![0.1, 0.9]);
    }

    #[test]
    fn truncated_buffer_drops_partial_point() {
        let mut raw = pack(&[1.0, 2.0, 3.0]).to_vec();
        raw.extend_from_slice(&[0xde, 0xad]);

        let cloud = PointCloud {
            id: 7,
            kind: PointCloudKind::Ground,
            points: raw.into(),
            intensities: Bytes::new(),
        };

        assert_eq!(cloud.num_points(), 1);
        assert_eq!(cloud.positions().count(), 1);
        assert_eq!(cloud.intensity_values().count(), 0);
    }

    #[test]
    fn total_points_sums_clouds() {
        let result = PointResult {
            timestamp: 0.0,
            clouds: vec![
                PointCloud {
                    id: 0,
                    kind: PointCloudKind::Raw,
                    points: pack(&[0.0; 9]),
                    intensities: Bytes::new(),
                },
                PointCloud {
                    id: 1,
                    kind: PointCloudKind::Background,
                    points: pack(&[0.0; 6]),
                    intensities: Bytes::new(),
                },
            ],
        };
        assert_eq!(result.total_points(), 5);
    }
}
