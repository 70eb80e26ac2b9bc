use lineage_flow_renderer::alias::AliasTable;
use lineage_flow_renderer::config::LayoutConfig;
use lineage_flow_renderer::filter::{Selection, filter_graph};
use lineage_flow_renderer::ir::Snapshot;
use lineage_flow_renderer::layout::{LayoutOutcome, Size, compute_layout};
use lineage_flow_renderer::layout_dump::LayoutDump;
use lineage_flow_renderer::text_metrics::FixedWidthMetrics;
use lineage_flow_renderer::theme::Theme;
use proptest::prelude::*;
use std::collections::{BTreeMap, HashSet};

#[derive(Debug, Clone)]
struct Shape {
    tables_per_system: Vec<usize>,
    entities: usize,
    consumers: usize,
    feeds: Vec<(usize, usize, u8)>,
    reads: Vec<(usize, usize)>,
    selected: Vec<bool>,
    width: f32,
    height: f32,
}

fn shape() -> impl Strategy<Value = Shape> {
    (
        prop::collection::vec(0usize..5, 0..5),
        0usize..5,
        0usize..4,
        prop::collection::vec((0usize..32, 0usize..8, 0u8..12), 0..24),
        prop::collection::vec((0usize..8, 0usize..4), 0..10),
        prop::collection::vec(any::<bool>(), 5),
        200.0f32..2000.0,
        80.0f32..1200.0,
    )
        .prop_map(
            |(tables_per_system, entities, consumers, feeds, reads, selected, width, height)| Shape {
                tables_per_system,
                entities,
                consumers,
                feeds,
                reads,
                selected,
                width,
                height,
            },
        )
}

fn build(shape: &Shape) -> (Snapshot, Selection) {
    let mut s = Snapshot::new();
    let mut tables = Vec::new();
    for (sys, count) in shape.tables_per_system.iter().enumerate() {
        let sys_id = format!("sys{sys}");
        s.push_node(&sys_id, &format!("System {sys}"), "origin-system", None, None);
        for t in 0..*count {
            let table_id = format!("{sys_id}.t{t}");
            s.push_node(&table_id, &format!("t{t}"), "origin-table", Some(&sys_id), Some(&sys_id));
            s.push_edge(&sys_id, &table_id, "hierarchy", None);
            tables.push(table_id);
        }
    }
    for e in 0..shape.entities {
        s.push_node(&format!("e{e}"), &format!("Entity {e} (unified)"), "canonical-entity", None, None);
    }
    for c in 0..shape.consumers {
        s.push_node(&format!("c{c}"), &format!("Consumer {c}"), "consumer", None, None);
    }
    if !tables.is_empty() && shape.entities > 0 {
        for (table, entity, weight) in &shape.feeds {
            s.push_edge(
                &tables[table % tables.len()],
                &format!("e{}", entity % shape.entities),
                "dataflow",
                Some(f32::from(*weight)),
            );
        }
    }
    if shape.entities > 0 && shape.consumers > 0 {
        for (entity, consumer) in &shape.reads {
            s.push_edge(
                &format!("e{}", entity % shape.entities),
                &format!("c{}", consumer % shape.consumers),
                "dataflow",
                None,
            );
        }
    }

    let systems = shape
        .tables_per_system
        .iter()
        .enumerate()
        .filter(|(sys, _)| shape.selected[*sys])
        .map(|(sys, _)| format!("sys{sys}"));
    (s, Selection::all().with_systems(systems))
}

fn run(snapshot: &Snapshot, selection: &Selection, size: Size) -> LayoutOutcome {
    let graph = filter_graph(snapshot, selection, &AliasTable::default());
    compute_layout(
        &graph,
        size,
        &Theme::light(),
        &LayoutConfig::default(),
        &FixedWidthMetrics::default(),
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn same_layer_rectangles_never_overlap(shape in shape()) {
        let (snapshot, selection) = build(&shape);
        let outcome = run(&snapshot, &selection, Size::new(shape.width, shape.height));
        if let Some(layout) = outcome.as_ready() {
            for (i, a) in layout.nodes.iter().enumerate() {
                for b in &layout.nodes[i + 1..] {
                    if a.layer == b.layer {
                        prop_assert!(!a.rect.overlaps_vertically(&b.rect), "{} overlaps {}", a.id, b.id);
                    }
                }
            }
        }
    }

    #[test]
    fn filtering_is_idempotent(shape in shape()) {
        let (snapshot, selection) = build(&shape);
        let aliases = AliasTable::default();
        let once = filter_graph(&snapshot, &selection, &aliases);
        let twice = filter_graph(&once.to_snapshot(), &selection, &aliases);
        prop_assert_eq!(&once, &twice);

        let kept: HashSet<&str> = once.nodes.iter().map(|node| node.id.as_str()).collect();
        for edge in &once.edges {
            prop_assert!(kept.contains(edge.source.as_str()));
            prop_assert!(kept.contains(edge.target.as_str()));
        }
    }

    #[test]
    fn filtering_is_idempotent_with_shadowed_system_ids(shape in shape(), shadow in 0usize..5) {
        let (snapshot, selection) = build(&shape);
        let mut shadowed = Snapshot::new();
        shadowed.push_node(&format!("sys{shadow}"), "Shadow", "consumer", None, None);
        shadowed.nodes.extend(snapshot.nodes);
        shadowed.edges = snapshot.edges;

        let aliases = AliasTable::default();
        let once = filter_graph(&shadowed, &selection, &aliases);
        let twice = filter_graph(&once.to_snapshot(), &selection, &aliases);
        prop_assert_eq!(&once, &twice);
    }

    #[test]
    fn viewport_contains_every_node_and_label(shape in shape()) {
        let (snapshot, selection) = build(&shape);
        let outcome = run(&snapshot, &selection, Size::new(shape.width, shape.height));
        if let Some(layout) = outcome.as_ready() {
            for node in &layout.nodes {
                prop_assert!(layout.viewport.contains(&node.rect), "node {}", node.id);
            }
            for label in &layout.labels {
                prop_assert!(layout.viewport.contains(&label.rect), "label {}", label.node_id);
            }
        }
    }

    #[test]
    fn same_column_labels_keep_min_gap(shape in shape()) {
        let (snapshot, selection) = build(&shape);
        let outcome = run(&snapshot, &selection, Size::new(shape.width, shape.height));
        let min_gap = LayoutConfig::default().label_min_gap;
        if let Some(layout) = outcome.as_ready() {
            let mut columns: BTreeMap<i64, Vec<_>> = BTreeMap::new();
            for label in &layout.labels {
                columns.entry(label.rect.x0.round() as i64).or_default().push(label.rect);
            }
            for rects in columns.values_mut() {
                rects.sort_by(|a, b| a.y0.total_cmp(&b.y0));
                for pair in rects.windows(2) {
                    prop_assert!(pair[1].y0 + 1e-3 >= pair[0].y1 + min_gap);
                }
            }
        }
    }

    #[test]
    fn layout_is_deterministic(shape in shape()) {
        let (snapshot, selection) = build(&shape);
        let size = Size::new(shape.width, shape.height);
        let a = LayoutDump::from_outcome(&run(&snapshot, &selection, size)).to_json().unwrap();
        let b = LayoutDump::from_outcome(&run(&snapshot, &selection, size)).to_json().unwrap();
        prop_assert_eq!(a, b);
    }
}
