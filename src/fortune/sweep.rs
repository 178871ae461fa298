//! 扫描线主循环
//!
//! 1. 所有站点作为站点事件入队
//! 2. 依次弹出事件：站点事件插入弧，圆事件移除弧
//! 3. 每次结构变化后，重新检测受影响弧的圆事件
//! 4. 队列清空后收尾：剩余断点上的边延伸到无穷远，删除零长度边
//!
//! 每段弧最多对应一个待处理的圆事件，记录在 `pending` 中，
//! 失效时只需置位标志，无需扫描整个堆。

use super::beachline::{Beachline, NodeId};
use super::config::FortuneConfig;
use super::error::{VoronoiError, VoronoiResult};
use super::event::{CircleEvent, CircleId, EventKind, EventQueue, QueuedEvent};
use super::graph::{GraphBuilder, Site, SiteId, VoronoiGraph};
use super::kernel::{CollinearTieBreak, GeometryKernel, Orientation};
use super::vector::Vector2;
use log::{debug, trace};
use std::collections::{HashMap, HashSet};
use std::time::Instant;

/// 一次 Fortune 扫描的全部状态
///
/// 实例只服务于一次计算，不在并发计算之间共享。
pub(crate) struct FortuneSweep {
    config: FortuneConfig,
    kernel: GeometryKernel,
    queue: EventQueue<QueuedEvent>,
    beachline: Beachline,
    graph: GraphBuilder,
    circles: Vec<CircleEvent>,
    pending: HashMap<NodeId, CircleId>,
    next_seq: u64,
    sweep_y: f64,
}

impl FortuneSweep {
    /// 校验站点并让所有站点事件入队
    ///
    /// # 错误
    /// 坐标非有限，或两个站点舍入后重合时返回 [`VoronoiError::InvalidInput`]。
    pub fn new(positions: Vec<Vector2>, config: FortuneConfig) -> VoronoiResult<Self> {
        config.validate()?;

        let mut seen = HashSet::with_capacity(positions.len());
        for (i, p) in positions.iter().enumerate() {
            if !p.is_finite() {
                return Err(VoronoiError::invalid_input(format!(
                    "site {} has a non-finite coordinate {}",
                    i, p
                )));
            }
            if !seen.insert(*p) {
                return Err(VoronoiError::invalid_input(format!(
                    "duplicate site {} at index {}",
                    p, i
                )));
            }
        }

        let kernel = GeometryKernel::new(config.precision);
        let mut sweep = Self {
            config,
            kernel,
            queue: EventQueue::with_capacity(positions.len() * 2),
            beachline: Beachline::new(positions.clone(), kernel),
            graph: GraphBuilder::new(),
            circles: Vec::new(),
            pending: HashMap::new(),
            next_seq: 0,
            sweep_y: f64::NEG_INFINITY,
        };
        for (i, p) in positions.iter().enumerate() {
            sweep.push_event(p.y(), p.x(), EventKind::Site(SiteId(i)));
        }
        Ok(sweep)
    }

    fn push_event(&mut self, y: f64, x: f64, kind: EventKind) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(QueuedEvent { y, x, kind, seq });
    }

    /// 运行到队列为空，返回收尾后的边与顶点
    pub fn run(mut self) -> VoronoiResult<GraphBuilder> {
        while let Some(event) = self.queue.pop() {
            self.sweep_y = event.y;
            match event.kind {
                EventKind::Site(site) => self.handle_site(site)?,
                EventKind::Circle(id) => self.handle_circle(id)?,
            }
        }
        self.finish()
    }

    fn handle_site(&mut self, site: SiteId) -> VoronoiResult<()> {
        let insertion = self
            .beachline
            .insert_site(site, self.sweep_y, &mut self.graph)?;

        // 被拆分的旧弧已经离开树，它的圆事件不再成立
        if let Some(replaced) = insertion.replaced {
            self.invalidate(replaced);
        }
        for arc in insertion.recheck {
            self.recheck(arc)?;
        }

        if self.config.guard_enclosed_circles {
            self.invalidate_enclosing(site);
        }
        Ok(())
    }

    fn handle_circle(&mut self, id: CircleId) -> VoronoiResult<()> {
        let event = &self.circles[id.0];
        let center = event.center;
        if self.pending.get(&center) == Some(&id) {
            self.pending.remove(&center);
        }
        if !event.valid {
            trace!("discarding invalidated circle event at y = {}", event.y);
            return Ok(());
        }

        let event = event.clone();
        match self.beachline.remove_arc(&event, &mut self.graph)? {
            Some(neighbors) => {
                for arc in neighbors {
                    self.recheck(arc)?;
                }
            }
            None => trace!("circle event at {} no longer matches the beachline", event.vertex),
        }
        Ok(())
    }

    fn invalidate(&mut self, arc: NodeId) {
        if let Some(id) = self.pending.remove(&arc) {
            self.circles[id.0].valid = false;
        }
    }

    /// 作废外接圆严格包含新站点的待处理圆事件
    ///
    /// 由新站点自己参与定义的圆不算在内，新站点就在这些圆上。
    fn invalidate_enclosing(&mut self, site: SiteId) {
        let position = self.beachline.position(site);
        for id in self.pending.values() {
            let circle = &mut self.circles[id.0];
            if circle.valid && !circle.involves(site) && circle.encloses(&position) {
                trace!("site {} falls inside circle around {}", position, circle.vertex);
                circle.valid = false;
            }
        }
    }

    /// 为弧重新生成圆事件
    fn recheck(&mut self, arc: NodeId) -> VoronoiResult<()> {
        self.invalidate(arc);
        if let Some(event) = self.circle_candidate(arc)? {
            let (y, x) = (event.y, event.vertex.x());
            let id = CircleId(self.circles.len());
            self.circles.push(event);
            self.pending.insert(arc, id);
            self.push_event(y, x, EventKind::Circle(id));
        }
        Ok(())
    }

    /// 由弧及其当前邻居构造圆事件
    ///
    /// 三个站点必须互不相同、严格逆时针，且圆的最低点不在扫描线之后。
    fn circle_candidate(&self, arc: NodeId) -> VoronoiResult<Option<CircleEvent>> {
        let (Some(left), Some(right)) = (
            self.beachline.left_neighbor(arc)?,
            self.beachline.right_neighbor(arc)?,
        ) else {
            return Ok(None);
        };

        let left_site = self.beachline.arc_site(left)?;
        let center_site = self.beachline.arc_site(arc)?;
        let right_site = self.beachline.arc_site(right)?;
        if left_site == right_site || left_site == center_site || center_site == right_site {
            return Ok(None);
        }

        let l = self.beachline.position(left_site);
        let n = self.beachline.position(center_site);
        let r = self.beachline.position(right_site);
        if self.kernel.orientation(&l, &n, &r, CollinearTieBreak::Strict)
            != Orientation::CounterClockwise
        {
            return Ok(None);
        }

        let vertex = self.kernel.circumcenter(&l, &n, &r)?;
        let precision = self.kernel.precision();
        let radius = n.distance(&vertex);
        let y = precision.round(vertex.y() + radius);
        if y < self.sweep_y && !precision.approx_eq(y, self.sweep_y) {
            return Ok(None);
        }

        Ok(Some(CircleEvent {
            center: arc,
            left_site,
            center_site,
            right_site,
            vertex,
            radius,
            y,
            valid: true,
        }))
    }

    fn finish(mut self) -> VoronoiResult<GraphBuilder> {
        self.beachline.finalize(&mut self.graph)?;
        self.graph
            .close_open_edges(self.beachline.positions(), self.kernel.precision());
        let removed = self.graph.remove_minute_edges();
        if removed > 0 {
            trace!("removed {} zero-length edges", removed);
        }
        Ok(self.graph)
    }
}

/// 对一组站点运行 Fortune 扫描
///
/// 站点坐标先按配置精度重新舍入；输出边引用的站点与舍入后的输入一致。
pub(crate) fn sweep_sites<T: Clone>(
    sites: &[Site<T>],
    config: &FortuneConfig,
) -> VoronoiResult<VoronoiGraph<T>> {
    let start = Instant::now();
    let sites: Vec<Site<T>> = sites
        .iter()
        .map(|s| Site::new(s.position.with_precision(config.precision), s.tag.clone()))
        .collect();
    let positions: Vec<Vector2> = sites.iter().map(|s| s.position).collect();

    debug!(
        "Fortune sweep: {} sites, precision {} decimals",
        sites.len(),
        config.precision.decimals()
    );

    let graph = FortuneSweep::new(positions, *config)?.run()?.build(&sites);

    debug!(
        "Fortune sweep done: {} vertices, {} edges in {:?}",
        graph.vertex_count(),
        graph.edge_count(),
        start.elapsed()
    );
    Ok(graph)
}
