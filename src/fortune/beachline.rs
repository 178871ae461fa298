//! 海滩线
//!
//! 不做平衡的二叉树：叶子是弧（[`NodeKind::Arc`]），内部节点是断点
//! （[`NodeKind::Breakpoint`]）。中序遍历得到从左到右的弧序列。
//!
//! ```text
//!              Breakpoint(e1)
//!              /            \
//!      Breakpoint(e2)      Arc(B)
//!       /         \
//!    Arc(A)      Arc(C)
//!
//!    海滩线:  A | C | B
//! ```
//!
//! 节点存放在 arena 中，以 [`NodeId`] 互相引用。一次计算期间节点从不释放，
//! 因此旧索引不会指向新节点；被替换的节点只会断开父链接。

use super::error::{VoronoiError, VoronoiResult};
use super::event::CircleEvent;
use super::graph::{EdgeId, GraphBuilder, SiteId, Vertex};
use super::kernel::GeometryKernel;
use super::vector::Vector2;

/// 海滩线节点索引
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

#[derive(Debug, Clone, Copy)]
pub(crate) enum NodeKind {
    /// 某个站点当前可见的抛物线段
    Arc { site: SiteId },
    /// 相邻两段弧的交点，沿一条 Voronoi 边移动
    ///
    /// `flipped` 为 `true` 时，边的 `right` 站点才是几何上的左侧。
    Breakpoint {
        edge: EdgeId,
        flipped: bool,
        left: NodeId,
        right: NodeId,
    },
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Node {
    pub parent: Option<NodeId>,
    pub kind: NodeKind,
}

/// 插入站点的结果
#[derive(Debug, Clone, Default)]
pub(crate) struct Insertion {
    /// 被拆分并移出树的旧弧
    pub replaced: Option<NodeId>,
    /// 需要重新检测圆事件的弧
    pub recheck: Vec<NodeId>,
}

#[derive(Debug)]
pub(crate) struct Beachline {
    nodes: Vec<Node>,
    root: Option<NodeId>,
    positions: Vec<Vector2>,
    kernel: GeometryKernel,
}

impl Beachline {
    /// `positions` 按 [`SiteId`] 索引
    pub fn new(positions: Vec<Vector2>, kernel: GeometryKernel) -> Self {
        Self {
            nodes: Vec::with_capacity(positions.len() * 4),
            root: None,
            positions,
            kernel,
        }
    }

    #[cfg(test)]
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub fn position(&self, site: SiteId) -> Vector2 {
        self.positions[site.0]
    }

    pub fn positions(&self) -> &[Vector2] {
        &self.positions
    }

    // ========================================================================
    // 节点访问
    // ========================================================================

    fn node(&self, id: NodeId, operation: &'static str) -> VoronoiResult<&Node> {
        self.nodes
            .get(id.0)
            .ok_or_else(|| VoronoiError::invariant(operation, format!("unknown node {}", id.0)))
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        self.nodes.push(Node { parent: None, kind });
        NodeId(self.nodes.len() - 1)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id.0).and_then(|n| n.parent)
    }

    /// 弧对应的站点；遇到断点说明树已损坏
    pub fn arc_site(&self, id: NodeId) -> VoronoiResult<SiteId> {
        match self.node(id, "arc_site")?.kind {
            NodeKind::Arc { site } => Ok(site),
            NodeKind::Breakpoint { .. } => Err(VoronoiError::invariant(
                "arc_site",
                format!("node {} is a breakpoint, expected an arc", id.0),
            )),
        }
    }

    /// 断点的左右子节点
    pub fn children(&self, id: NodeId) -> VoronoiResult<(NodeId, NodeId)> {
        match self.node(id, "children")?.kind {
            NodeKind::Breakpoint { left, right, .. } => Ok((left, right)),
            NodeKind::Arc { .. } => Err(VoronoiError::invariant(
                "children",
                format!("node {} is an arc, expected a breakpoint", id.0),
            )),
        }
    }

    fn breakpoint(&self, id: NodeId) -> VoronoiResult<(EdgeId, bool)> {
        match self.node(id, "breakpoint")?.kind {
            NodeKind::Breakpoint { edge, flipped, .. } => Ok((edge, flipped)),
            NodeKind::Arc { .. } => Err(VoronoiError::invariant(
                "breakpoint",
                format!("node {} is an arc, expected a breakpoint", id.0),
            )),
        }
    }

    fn set_child(&mut self, parent: NodeId, old: NodeId, new: NodeId) -> VoronoiResult<()> {
        let node = self
            .nodes
            .get_mut(parent.0)
            .ok_or_else(|| VoronoiError::invariant("replace", format!("unknown node {}", parent.0)))?;
        match &mut node.kind {
            NodeKind::Breakpoint { left, right, .. } => {
                if *left == old {
                    *left = new;
                } else if *right == old {
                    *right = new;
                } else {
                    return Err(VoronoiError::invariant(
                        "replace",
                        format!("node {} is not a child of {}", old.0, parent.0),
                    ));
                }
                Ok(())
            }
            NodeKind::Arc { .. } => Err(VoronoiError::invariant(
                "replace",
                format!("parent {} of node {} is an arc", parent.0, old.0),
            )),
        }
    }

    fn set_parent(&mut self, id: NodeId, parent: Option<NodeId>) {
        if let Some(node) = self.nodes.get_mut(id.0) {
            node.parent = parent;
        }
    }

    fn leftmost_arc(&self, mut id: NodeId) -> VoronoiResult<NodeId> {
        while let NodeKind::Breakpoint { left, .. } = self.node(id, "leftmost_arc")?.kind {
            id = left;
        }
        Ok(id)
    }

    fn rightmost_arc(&self, mut id: NodeId) -> VoronoiResult<NodeId> {
        while let NodeKind::Breakpoint { right, .. } = self.node(id, "rightmost_arc")?.kind {
            id = right;
        }
        Ok(id)
    }

    // ========================================================================
    // 查询
    // ========================================================================

    /// 断点几何上左、右两侧的站点
    fn breakpoint_sites(&self, id: NodeId, graph: &GraphBuilder) -> VoronoiResult<(SiteId, SiteId)> {
        let (edge, flipped) = self.breakpoint(id)?;
        let record = graph.edge(edge)?;
        Ok(if flipped {
            (record.right, record.left)
        } else {
            (record.left, record.right)
        })
    }

    /// 断点在扫描线位于 `sweep_y` 时的 x 坐标
    pub fn breakpoint_x(&self, id: NodeId, sweep_y: f64, graph: &GraphBuilder) -> VoronoiResult<f64> {
        let (left, right) = self.breakpoint_sites(id, graph)?;
        self.kernel
            .parabolic_cut(&self.position(left), &self.position(right), sweep_y)
    }

    /// 找到 x 处位于扫描线正上方的弧
    pub fn locate(&self, x: f64, sweep_y: f64, graph: &GraphBuilder) -> VoronoiResult<NodeId> {
        let mut current = self
            .root
            .ok_or_else(|| VoronoiError::invariant("locate", "beachline is empty"))?;
        let precision = self.kernel.precision();

        while let NodeKind::Breakpoint { left, right, .. } = self.node(current, "locate")?.kind {
            let offset = precision.round(x - self.breakpoint_x(current, sweep_y, graph)?);
            current = if offset < 0.0 { left } else { right };
        }
        Ok(current)
    }

    /// 左侧相邻的弧
    pub fn left_neighbor(&self, arc: NodeId) -> VoronoiResult<Option<NodeId>> {
        let mut current = arc;
        while let Some(parent) = self.parent(current) {
            let (left, right) = self.children(parent)?;
            if right == current {
                return self.rightmost_arc(left).map(Some);
            }
            current = parent;
        }
        Ok(None)
    }

    /// 右侧相邻的弧
    pub fn right_neighbor(&self, arc: NodeId) -> VoronoiResult<Option<NodeId>> {
        let mut current = arc;
        while let Some(parent) = self.parent(current) {
            let (left, right) = self.children(parent)?;
            if left == current {
                return self.leftmost_arc(right).map(Some);
            }
            current = parent;
        }
        Ok(None)
    }

    /// 弧右侧的断点：左子树包含该弧的最近祖先
    pub fn right_bounding_edge(&self, arc: NodeId) -> VoronoiResult<NodeId> {
        let mut current = arc;
        while let Some(parent) = self.parent(current) {
            let (left, _) = self.children(parent)?;
            if left == current {
                return Ok(parent);
            }
            current = parent;
        }
        Err(VoronoiError::invariant(
            "right_bounding_edge",
            format!("arc {} is the rightmost arc of the beachline", arc.0),
        ))
    }

    // ========================================================================
    // 结构修改
    // ========================================================================

    /// 用 `new` 替换 `old` 所在的位置，`old` 断开父链接
    pub fn replace(&mut self, old: NodeId, new: NodeId) -> VoronoiResult<()> {
        match self.parent(old) {
            Some(parent) => {
                self.set_child(parent, old, new)?;
                self.set_parent(new, Some(parent));
            }
            None => {
                if self.root != Some(old) {
                    return Err(VoronoiError::invariant(
                        "replace",
                        format!("node {} is not in the beachline", old.0),
                    ));
                }
                self.root = Some(new);
                self.set_parent(new, None);
            }
        }
        self.set_parent(old, None);
        Ok(())
    }

    fn new_breakpoint(&mut self, edge: EdgeId, flipped: bool, left: NodeId, right: NodeId) -> NodeId {
        let id = self.push(NodeKind::Breakpoint {
            edge,
            flipped,
            left,
            right,
        });
        self.set_parent(left, Some(id));
        self.set_parent(right, Some(id));
        id
    }

    /// 站点事件：把新站点的弧插入海滩线
    ///
    /// 同一水平线上的站点拆成两段弧，否则拆成 旧 / 新 / 旧 三段，
    /// 两个断点共用一条新边、`flipped` 相反。
    pub fn insert_site(
        &mut self,
        site: SiteId,
        sweep_y: f64,
        graph: &mut GraphBuilder,
    ) -> VoronoiResult<Insertion> {
        if self.root.is_none() {
            let arc = self.push(NodeKind::Arc { site });
            self.root = Some(arc);
            return Ok(Insertion {
                replaced: None,
                recheck: vec![arc],
            });
        }

        let position = self.position(site);
        let old = self.locate(position.x(), sweep_y, graph)?;
        let old_site = self.arc_site(old)?;
        let old_position = self.position(old_site);
        let edge = graph.new_edge(old_site, site);

        let (subtree, recheck) = if self.kernel.precision().approx_eq(old_position.y(), position.y()) {
            let old_arc = self.push(NodeKind::Arc { site: old_site });
            let new_arc = self.push(NodeKind::Arc { site });
            let subtree = if old_position.x() < position.x() {
                self.new_breakpoint(edge, false, old_arc, new_arc)
            } else {
                self.new_breakpoint(edge, true, new_arc, old_arc)
            };
            let (left, right) = self.children(subtree)?;
            (subtree, vec![left, right])
        } else {
            let left_arc = self.push(NodeKind::Arc { site: old_site });
            let new_arc = self.push(NodeKind::Arc { site });
            let right_arc = self.push(NodeKind::Arc { site: old_site });
            let inner = self.new_breakpoint(edge, true, new_arc, right_arc);
            let subtree = self.new_breakpoint(edge, false, left_arc, inner);
            (subtree, vec![left_arc, new_arc, right_arc])
        };

        self.replace(old, subtree)?;
        Ok(Insertion {
            replaced: Some(old),
            recheck,
        })
    }

    /// 圆事件：把中间弧挤出海滩线
    ///
    /// 重新从树中求出中间弧的邻居；弧已脱离树，或邻居站点与事件记录不一致时
    /// 放弃（返回 `None`，不修改树）。否则返回需要重新检测的左右两段弧。
    pub fn remove_arc(
        &mut self,
        event: &CircleEvent,
        graph: &mut GraphBuilder,
    ) -> VoronoiResult<Option<[NodeId; 2]>> {
        let b = event.center;
        let Some(eu) = self.parent(b) else {
            return Ok(None);
        };
        let (Some(a), Some(c)) = (self.left_neighbor(b)?, self.right_neighbor(b)?) else {
            return Ok(None);
        };
        if self.arc_site(a)? != event.left_site || self.arc_site(c)? != event.right_site {
            return Ok(None);
        }

        let vertex = event.vertex;
        graph.add_vertex(vertex);

        // 中间弧是父断点的左孩子时，右邻居是其兄弟子树，另一侧断点在左邻居的祖先上
        let (eu_left, eu_right) = self.children(eu)?;
        let eo = if eu_left == b {
            let eo = self.right_bounding_edge(a)?;
            self.replace(eu, eu_right)?;
            eo
        } else {
            let eo = self.right_bounding_edge(b)?;
            self.replace(eu, eu_left)?;
            eo
        };
        self.set_parent(b, None);

        let (eu_edge, _) = self.breakpoint(eu)?;
        graph.edge_mut(eu_edge)?.add_vertex(Vertex::Finite(vertex))?;
        let (eo_edge, _) = self.breakpoint(eo)?;
        graph.edge_mut(eo_edge)?.add_vertex(Vertex::Finite(vertex))?;

        let a_site = self.arc_site(a)?;
        let c_site = self.arc_site(c)?;
        let edge = graph.new_edge(a_site, c_site);
        graph.edge_mut(edge)?.add_vertex(Vertex::Finite(vertex))?;

        let (eo_left, eo_right) = self.children(eo)?;
        let merged = self.new_breakpoint(edge, false, eo_left, eo_right);
        self.replace(eo, merged)?;

        Ok(Some([a, c]))
    }

    /// 扫描结束：剩余断点上的边延伸到无穷远
    ///
    /// 未确定的槽位填为无穷远，`flipped` 的断点交换边的左右站点，并标记完成。
    pub fn finalize(&self, graph: &mut GraphBuilder) -> VoronoiResult<()> {
        let mut stack: Vec<NodeId> = self.root.into_iter().collect();
        while let Some(id) = stack.pop() {
            if let NodeKind::Breakpoint {
                edge,
                flipped,
                left,
                right,
            } = self.node(id, "finalize")?.kind
            {
                let record = graph.edge_mut(edge)?;
                record.close_with_infinity();
                if flipped {
                    record.swap_sites();
                }
                record.done = true;
                stack.push(right);
                stack.push(left);
            }
        }
        Ok(())
    }

    /// 中序遍历得到的弧序列（站点）
    #[cfg(test)]
    pub fn arc_sites(&self) -> VoronoiResult<Vec<SiteId>> {
        let mut sites = Vec::new();
        let mut stack: Vec<NodeId> = self.root.into_iter().collect();
        while let Some(id) = stack.pop() {
            match self.node(id, "arc_sites")?.kind {
                NodeKind::Arc { site } => sites.push(site),
                NodeKind::Breakpoint { left, right, .. } => {
                    stack.push(right);
                    stack.push(left);
                }
            }
        }
        Ok(sites)
    }
}
