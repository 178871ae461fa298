//! 扫描事件与事件队列
//!
//! 队列是普通的二叉最小堆，不支持按标识删除。
//! 失效的圆事件只把 `valid` 置为 `false`，留在堆里，弹出时再丢弃。

use super::beachline::NodeId;
use super::graph::SiteId;
use super::vector::Vector2;
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

/// 二叉最小堆
#[derive(Debug, Clone)]
pub struct EventQueue<E: Ord> {
    heap: BinaryHeap<Reverse<E>>,
}

impl<E: Ord> Default for EventQueue<E> {
    fn default() -> Self {
        Self {
            heap: BinaryHeap::new(),
        }
    }
}

impl<E: Ord> EventQueue<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            heap: BinaryHeap::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, event: E) {
        self.heap.push(Reverse(event));
    }

    /// 弹出最小事件
    pub fn pop(&mut self) -> Option<E> {
        self.heap.pop().map(|Reverse(event)| event)
    }

    pub fn peek(&self) -> Option<&E> {
        self.heap.peek().map(|Reverse(event)| event)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

/// 圆事件在事件表中的索引
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CircleId(pub(crate) usize);

/// 队列中的事件种类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Circle(CircleId),
    Site(SiteId),
}

impl EventKind {
    // 同一键值下圆事件先于站点事件
    fn rank(self) -> u8 {
        match self {
            EventKind::Circle(_) => 0,
            EventKind::Site(_) => 1,
        }
    }
}

/// 入队的事件
///
/// 排序键依次为 `(y, x)`、事件种类、入队序号，
/// 因此同一输入的弹出顺序完全确定。
#[derive(Debug, Clone, Copy)]
pub struct QueuedEvent {
    pub y: f64,
    pub x: f64,
    pub kind: EventKind,
    pub seq: u64,
}

impl Ord for QueuedEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        self.y
            .total_cmp(&other.y)
            .then_with(|| self.x.total_cmp(&other.x))
            .then_with(|| self.kind.rank().cmp(&other.kind.rank()))
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

impl PartialOrd for QueuedEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for QueuedEvent {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueuedEvent {}

/// 预测的圆事件
///
/// 只记录中间弧的节点。邻居弧被拆分后节点会换新，事件仍然成立，
/// 所以移除时以站点比较邻居，防止结构漂移后误删。
#[derive(Debug, Clone)]
pub struct CircleEvent {
    pub center: NodeId,
    pub left_site: SiteId,
    pub center_site: SiteId,
    pub right_site: SiteId,
    /// 外接圆圆心，即将生成的 Voronoi 顶点
    pub vertex: Vector2,
    /// 圆心到中间站点的距离，未经事件键的舍入
    pub radius: f64,
    /// 圆的最低点（圆心 y 加半径），事件触发位置
    pub y: f64,
    pub valid: bool,
}

impl CircleEvent {
    /// 站点是否是定义该圆的三个站点之一
    pub fn involves(&self, site: SiteId) -> bool {
        site == self.left_site || site == self.center_site || site == self.right_site
    }

    /// 点是否严格位于外接圆内部
    ///
    /// 容差随半径放大：圆心已按精度舍入，远处站点的距离误差也随之变大。
    pub fn encloses(&self, point: &Vector2) -> bool {
        let tolerance = self.vertex.precision().epsilon() * (1.0 + self.radius);
        self.vertex.distance(point) < self.radius - tolerance
    }
}
