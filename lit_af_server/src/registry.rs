use tokio::sync::mpsc;
use uuid::Uuid;

use crate::error::RegistryError;

/// 连接的稳定标识，在连接建立时分配，断开前不会改变
pub type ConnId = Uuid;

/// 向某个连接的写任务投递文本的通道
pub type Outbound = mpsc::Sender<String>;

#[derive(Debug, Clone)]
pub struct Connection {
    pub id: ConnId,
    pub sender: Outbound,
}

/// 按加入顺序排列的在线连接
///
/// 玩家序号就是连接在列表中的位置，始终是稠密的 0..N-1。
/// 删除一个连接会让后面所有人的序号减一，所以序号只能在
/// 协调器处理同一个事件的过程中使用，不能跨事件缓存。
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    conns: Vec<Connection>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一个连接，返回它的序号
    pub fn register(&mut self, id: ConnId, sender: Outbound) -> usize {
        self.conns.push(Connection { id, sender });
        self.conns.len() - 1
    }

    pub fn index_of(&self, id: ConnId) -> Result<usize, RegistryError> {
        self.conns
            .iter()
            .position(|c| c.id == id)
            .ok_or(RegistryError::NotFound(id))
    }

    /// 删除连接，返回它删除前的序号
    pub fn remove(&mut self, id: ConnId) -> Result<usize, RegistryError> {
        let idx = self.index_of(id)?;
        self.conns.remove(idx);
        Ok(idx)
    }

    pub fn sender(&self, id: ConnId) -> Option<&Outbound> {
        self.conns.iter().find(|c| c.id == id).map(|c| &c.sender)
    }

    /// 按序号排列的全部连接 id
    pub fn ids(&self) -> Vec<ConnId> {
        self.conns.iter().map(|c| c.id).collect()
    }

    /// 当前连接集合的快照，广播时遍历快照而不是活的列表
    pub fn snapshot(&self) -> Vec<Connection> {
        self.conns.clone()
    }

    pub fn len(&self) -> usize {
        self.conns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conns.is_empty()
    }
}
