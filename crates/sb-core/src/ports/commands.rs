use crate::triggers::Command;

/// Port for the dispatcher's view of the trigger bridge.
///
/// 调度器读取触发器桥的端口。
///
/// # Behavior / 行为
/// - `poll()` drains everything pending in arrival order, atomically.
/// - `poll()` never blocks beyond a short mutex hand-off.
///
/// - `poll()` 原子地按到达顺序取走全部待处理命令。
/// - `poll()` 除短暂的互斥交接外不得阻塞。
pub trait CommandFeedPort: Send + Sync {
    fn poll(&self) -> Vec<Command>;
}
