//! Ports - 外部依存の抽象化
//!
//! 時刻・待機・ID 生成を trait として切り出し、テストで差し替え可能にする。

pub mod clock;
pub mod id_generator;
pub mod sleeper;

pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::id_generator::{IdGenerator, UlidGenerator};
pub use self::sleeper::{RecordingSleeper, Sleeper, ThreadSleeper};
