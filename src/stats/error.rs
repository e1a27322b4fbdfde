use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StatsError {
    #[error("搜索深度 {depth} 超出统计范围 0..{max}")]
    DepthOutOfRange { depth: usize, max: usize },
}
