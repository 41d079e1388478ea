//! App - タスクの構築と実行
//!
//! # 主要コンポーネント
//! - **TaskVariant**: variant ごとの hook（capability interface）
//! - **TaskBuilder**: 構築と起動時検証（Fail-fast）
//! - **TaskContext**: hook から見える options / return values / context
//! - **Task**: 実行（begin log → run_task → return values）

pub mod builder;
pub mod context;
pub mod task;
pub mod variant;

pub use self::builder::TaskBuilder;
pub use self::context::TaskContext;
pub use self::task::{Task, begin_log_lines};
pub use self::variant::TaskVariant;
