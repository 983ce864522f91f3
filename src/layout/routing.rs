use std::collections::HashMap;

use crate::model::TopologyData;

use super::{LayoutEdge, Point, Rect, TopologyLayout};

/// Prefix of the element id a rendered node exposes for lookup.
pub const NODE_ELEMENT_PREFIX: &str = "topo-node-";

pub fn node_element_id(node_id: &str) -> String {
    format!("{NODE_ELEMENT_PREFIX}{node_id}")
}

/// Where rendered node boxes and their container can be looked up, in one
/// shared coordinate space.
pub trait AnchorSource {
    fn bounding_box(&self, element_id: &str) -> Option<Rect>;

    fn container_box(&self) -> Option<Rect>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct CurveLink {
    pub id: String,
    pub source: String,
    pub target: String,
    pub start: Point,
    pub end: Point,
    /// SVG path data.
    pub path: String,
}

/// `M{start} C{mid},{start.y} {mid},{end.y} {end}`: horizontal tangents at
/// both ends, control points on the vertical through the midpoint.
pub fn curve_path(start: Point, end: Point) -> String {
    let mid_x = (start.x + end.x) / 2.0;
    format!(
        "M{},{} C{},{} {},{} {},{}",
        start.x, start.y, mid_x, start.y, mid_x, end.y, end.x, end.y
    )
}

/// Curves for every predecessor and successor link, measured from the
/// anchors' element boxes.
///
/// No container means nothing to anchor against and yields no links. An
/// element that cannot be found is treated as centred on `{0, 0}` before
/// the container offset is applied, so the link is still emitted with a
/// degenerate endpoint.
pub fn route_links(data: &TopologyData, anchors: &impl AnchorSource) -> Vec<CurveLink> {
    let Some(container) = anchors.container_box() else {
        tracing::debug!("no topology container, skipping link routing");
        return Vec::new();
    };

    let mut links = Vec::new();
    for pred in &data.predecessors {
        for task_id in &pred.links_to {
            links.push(route_one(&pred.id, task_id, &container, anchors));
        }
    }
    for succ in &data.successors {
        for task_id in &succ.links_to {
            links.push(route_one(task_id, &succ.id, &container, anchors));
        }
    }
    links
}

/// Curves for every edge of a computed layout, serial step edges included.
pub fn route_layout_edges(layout: &TopologyLayout, anchors: &impl AnchorSource) -> Vec<CurveLink> {
    let Some(container) = anchors.container_box() else {
        return Vec::new();
    };
    layout
        .edges
        .iter()
        .map(|edge: &LayoutEdge| route_one(&edge.source, &edge.target, &container, anchors))
        .collect()
}

fn route_one(source: &str, target: &str, container: &Rect, anchors: &impl AnchorSource) -> CurveLink {
    let start = relative_center(source, container, anchors);
    let end = relative_center(target, container, anchors);
    CurveLink {
        id: format!("{source}-{target}"),
        source: source.to_string(),
        target: target.to_string(),
        start,
        end,
        path: curve_path(start, end),
    }
}

fn relative_center(node_id: &str, container: &Rect, anchors: &impl AnchorSource) -> Point {
    let center = match anchors.bounding_box(&node_element_id(node_id)) {
        Some(rect) => rect.center(),
        None => {
            tracing::warn!(node = node_id, "anchor element missing, routing from origin");
            Point::ORIGIN
        }
    };
    Point::new(center.x - container.x, center.y - container.y)
}

/// Boxes measured from a rendering surface, keyed by element id.
#[derive(Debug, Clone, Default)]
pub struct MeasuredAnchors {
    pub container: Option<Rect>,
    pub boxes: HashMap<String, Rect>,
}

impl MeasuredAnchors {
    pub fn new(container: Rect) -> Self {
        Self {
            container: Some(container),
            boxes: HashMap::new(),
        }
    }

    pub fn insert(&mut self, node_id: &str, rect: Rect) {
        self.boxes.insert(node_element_id(node_id), rect);
    }
}

impl AnchorSource for MeasuredAnchors {
    fn bounding_box(&self, element_id: &str) -> Option<Rect> {
        self.boxes.get(element_id).copied()
    }

    fn container_box(&self) -> Option<Rect> {
        self.container
    }
}

/// Node boxes taken straight from a computed layout, translated into a
/// container anchored at the origin.
#[derive(Debug, Clone)]
pub struct LayoutAnchors<'a> {
    layout: &'a TopologyLayout,
    offset: Point,
    container: Rect,
}

impl<'a> LayoutAnchors<'a> {
    /// Shifts the layout so its bounds start `padding` inside a container at the origin.
    pub fn new(layout: &'a TopologyLayout, padding: f32) -> Self {
        let bounds = layout.bounds().unwrap_or_default();
        let offset = Point::new(padding - bounds.x, padding - bounds.y);
        let container = Rect::new(
            0.0,
            0.0,
            bounds.width + padding * 2.0,
            bounds.height + padding * 2.0,
        );
        Self {
            layout,
            offset,
            container,
        }
    }

    /// Translation applied to layout coordinates.
    pub fn offset(&self) -> Point {
        self.offset
    }

    pub fn container(&self) -> Rect {
        self.container
    }
}

impl AnchorSource for LayoutAnchors<'_> {
    fn bounding_box(&self, element_id: &str) -> Option<Rect> {
        let node_id = element_id.strip_prefix(NODE_ELEMENT_PREFIX)?;
        self.layout.node(node_id).map(|node| {
            let rect = node.rect();
            Rect::new(
                rect.x + self.offset.x,
                rect.y + self.offset.y,
                rect.width,
                rect.height,
            )
        })
    }

    fn container_box(&self) -> Option<Rect> {
        Some(self.container)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use crate::layout::compute_layout;
    use crate::model::{ChangeRef, Task, TaskStatus};

    fn sample() -> TopologyData {
        let mut data = TopologyData::with_steps(vec![
            vec![Task::new("T1", TaskStatus::Success)],
            vec![Task::new("T2", TaskStatus::Running)],
        ]);
        data.predecessors.push(ChangeRef::new("C1", "pre", &["T1"]));
        data.successors.push(ChangeRef::new("C2", "post", &["T2"]));
        data
    }

    #[test]
    fn curve_is_symmetric_s_shape() {
        let path = curve_path(Point::new(10.0, 20.0), Point::new(110.0, 60.0));
        assert_eq!(path, "M10,20 C60,20 60,60 110,60");
    }

    #[test]
    fn links_are_relative_to_container() {
        let mut anchors = MeasuredAnchors::new(Rect::new(100.0, 50.0, 800.0, 600.0));
        anchors.insert("C1", Rect::new(100.0, 50.0, 40.0, 20.0));
        anchors.insert("T1", Rect::new(300.0, 50.0, 40.0, 20.0));
        anchors.insert("T2", Rect::new(400.0, 50.0, 40.0, 20.0));
        anchors.insert("C2", Rect::new(500.0, 90.0, 40.0, 20.0));

        let links = route_links(&sample(), &anchors);
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].id, "C1-T1");
        assert_eq!(links[0].path, "M20,10 C120,10 120,10 220,10");
        // Successor links run from the task into the change.
        assert_eq!(links[1].id, "T2-C2");
        assert_eq!(links[1].start, Point::new(320.0, 10.0));
        assert_eq!(links[1].end, Point::new(420.0, 50.0));
    }

    #[test]
    fn missing_anchor_defaults_to_origin() {
        let mut anchors = MeasuredAnchors::new(Rect::new(10.0, 5.0, 800.0, 600.0));
        anchors.insert("C1", Rect::new(10.0, 5.0, 40.0, 20.0));
        let mut data = sample();
        data.successors.clear();

        let links = route_links(&data, &anchors);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].end, Point::new(-10.0, -5.0));
        assert_eq!(links[0].path, "M20,10 C5,10 5,-5 -10,-5");
    }

    #[test]
    fn missing_container_yields_no_links() {
        let anchors = MeasuredAnchors::default();
        assert!(route_links(&sample(), &anchors).is_empty());
    }

    #[test]
    fn layout_anchors_route_every_edge() {
        let data = sample();
        let layout = compute_layout(&data, &LayoutConfig::default());
        let anchors = LayoutAnchors::new(&layout, 10.0);
        let links = route_layout_edges(&layout, &anchors);
        let ids: Vec<&str> = links.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["C1-T1", "T1-T2", "T2-C2"]);

        // C1 sits at the top-left of the bounds, its centre is padding + half the node.
        assert_eq!(links[0].start, Point::new(10.0 + 75.0, 10.0 + 30.0));
        assert!(links.iter().all(|l| l.end.x > l.start.x));
    }
}
