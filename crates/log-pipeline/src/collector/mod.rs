//! 로그 수집 모듈 -- 파일 끝에 추가되는 라인을 읽습니다.
//!
//! # 수집 소스
//! - [`FileTail`]: 파일 감시 (`tail -f` 방식, 폴링)
//!
//! 수집기는 스스로 대기하지 않습니다. 새 라인이 없으면 즉시 `None`을 돌려주고,
//! 대기 여부는 [`LogMonitor`](crate::monitor::LogMonitor)가 결정합니다.

pub mod file;

pub use file::{FileTail, TailState};
