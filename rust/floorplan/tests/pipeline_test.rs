// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! End-to-end reconstruction of small synthetic floor plans.

use approx::assert_relative_eq;
use r2v_floorplan::room_extractor::{extract_rooms, trace_face, MAX_TRACE_STEPS};
use r2v_floorplan::openings::assign_openings;
use r2v_floorplan::straightener::inclination;
use r2v_floorplan::{
    reconstruct, Hole, HoleKind, House, ParserConfig, PipelineOptions, Point2D, RawRecord,
    RecordCategory, RoomKey, SourceKind, WallKey, WallLinkageGraph,
};

fn p(x: f64, y: f64) -> Point2D {
    Point2D::new(x, y)
}

fn vocabulary() -> Vec<String> {
    ["bedroom", "kitchen", "outside"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Annotation file line
fn line(x1: i32, y1: i32, x2: i32, y2: i32, category: &str) -> String {
    format!("{x1}\t{y1}\t{x2}\t{y2}\t{category}\t1\t1\n")
}

/// 200 x 100 rectangle with an internal wall at x = 100. The outer walls
/// are single records and must be split at the internal wall's ends.
fn split_rectangle_walls() -> Vec<RawRecord> {
    vec![
        RawRecord::wall(p(0.0, 0.0), p(200.0, 0.0), None, None),
        RawRecord::wall(p(200.0, 0.0), p(200.0, 100.0), None, None),
        RawRecord::wall(p(200.0, 100.0), p(0.0, 100.0), None, None),
        RawRecord::wall(p(0.0, 100.0), p(0.0, 0.0), None, None),
        RawRecord::wall(p(100.0, 0.0), p(100.0, 100.0), None, None),
    ]
}

#[test]
fn test_unit_square_scenario() {
    let mut graph = WallLinkageGraph::new(0.5);
    let corners = [p(0.0, 0.0), p(10.0, 0.0), p(10.0, 10.0), p(0.0, 10.0)];
    for i in 0..4 {
        graph
            .add_wall(corners[i], corners[(i + 1) % 4], None, None)
            .unwrap();
    }

    let rooms = extract_rooms(&graph).unwrap();
    assert_eq!(rooms.len(), 1);

    let room = rooms.iter().next().unwrap();
    assert_eq!(room.walls.len(), 4);
    let polygon = room.polygon(&graph).unwrap().unwrap();
    assert_relative_eq!(polygon.area(), 100.0);
}

#[test]
fn test_corner_merge_idempotence() {
    let mut graph = WallLinkageGraph::new(0.5);
    graph.add_wall(p(0.0, 0.0), p(10.0, 0.0), None, None).unwrap();
    graph.add_wall(p(0.3, 0.2), p(0.0, 20.0), None, None).unwrap();
    assert_eq!(graph.corner_count(), 3);

    // Farther than the tolerance from (10, 0)
    graph.add_wall(p(10.6, 0.0), p(20.0, 0.0), None, None).unwrap();
    assert_eq!(graph.corner_count(), 5);
}

#[test]
fn test_no_degenerate_walls() {
    let mut graph = WallLinkageGraph::new(0.5);
    assert!(graph.add_wall(p(5.0, 5.0), p(5.0, 5.0), None, None).unwrap().is_none());
    graph.add_wall(p(0.0, 0.0), p(10.0, 0.0), None, None).unwrap();
    graph.add_wall(p(10.0, 0.0), p(10.0, 10.0), None, None).unwrap();

    assert_eq!(graph.wall_count(), 2);
    for (key, _) in graph.walls() {
        let (a, b) = graph.wall_endpoints(key).unwrap();
        assert_ne!(a, b);
    }
}

#[test]
fn test_split_rectangle_reconstruction() {
    let mut house = House::from_records("split.txt", split_rectangle_walls());
    house
        .reconstruct(&ParserConfig::default(), &PipelineOptions::default(), &[])
        .unwrap();

    // Top and bottom split at the internal wall
    assert_eq!(house.graph.wall_count(), 7);
    assert_eq!(house.rooms.len(), 2);
    for room in house.rooms.iter() {
        assert_eq!(room.walls.len(), 4);
        let area = room.polygon(&house.graph).unwrap().unwrap().area();
        assert_relative_eq!(area, 10_000.0);
    }
}

#[test]
fn test_room_keys_stable_across_extraction() {
    let mut house = House::from_records("stable.txt", split_rectangle_walls());
    house.split_source_walls(&ParserConfig::default());
    house.generate_wall_graph(&ParserConfig::default()).unwrap();

    let first: Vec<RoomKey> = house.rooms.keys().cloned().collect();
    let second: Vec<RoomKey> = extract_rooms(&house.graph).unwrap().keys().cloned().collect();
    assert_eq!(first, second);
    assert_eq!(first.len(), 3);
}

#[test]
fn test_face_traces_close_without_dangling_walls() {
    let mut house = House::from_records("closure.txt", split_rectangle_walls());
    house.split_source_walls(&ParserConfig::default());
    house.generate_wall_graph(&ParserConfig::default()).unwrap();

    let graph = &house.graph;
    for (key, wall) in graph.walls() {
        for start in [wall.p1, wall.p2] {
            let trace = trace_face(graph, start, key).unwrap();
            assert!(trace.closed);
            assert!(trace.walls.len() <= MAX_TRACE_STEPS);
            let polyline = graph.polyline(&trace.walls).unwrap();
            assert_eq!(polyline.first(), polyline.last());
        }
    }
}

/// Square outline cut into `per_side` walls of length 10 on each side.
fn segmented_square(per_side: usize) -> Vec<RawRecord> {
    let side = per_side as f64 * 10.0;
    let corners = [p(0.0, 0.0), p(side, 0.0), p(side, side), p(0.0, side)];
    let mut records = Vec::with_capacity(per_side * 4);
    for i in 0..4 {
        let (a, b) = (corners[i], corners[(i + 1) % 4]);
        let step = p((b.x - a.x) / per_side as f64, (b.y - a.y) / per_side as f64);
        for k in 0..per_side {
            let (k0, k1) = (k as f64, (k + 1) as f64);
            records.push(RawRecord::wall(
                p(a.x + step.x * k0, a.y + step.y * k0),
                p(a.x + step.x * k1, a.y + step.y * k1),
                None,
                None,
            ));
        }
    }
    records
}

#[test]
fn test_long_outline_within_step_cap_is_one_room() {
    let mut house = House::from_records("ring_400.txt", segmented_square(100));
    house
        .reconstruct(&ParserConfig::default(), &PipelineOptions::default(), &[])
        .unwrap();

    assert_eq!(house.graph.wall_count(), 400);
    assert_eq!(house.rooms.len(), 1);
    let room = house.rooms.iter().next().unwrap();
    assert_eq!(room.walls.len(), 400);
    assert_relative_eq!(room.polygon(&house.graph).unwrap().unwrap().area(), 1.0e6, epsilon = 1e-6);
}

#[test]
fn test_outline_beyond_step_cap_reconstructs_without_rooms() {
    let mut house = House::from_records("ring_600.txt", segmented_square(150));
    house
        .reconstruct(&ParserConfig::default(), &PipelineOptions::default(), &[])
        .unwrap();

    assert_eq!(house.graph.wall_count(), 600);
    assert!(house.rooms.is_empty());
    assert!(house.rdr.is_empty());
}

#[test]
fn test_straightening_converges() {
    let walls = vec![
        RawRecord::wall(p(0.0, 0.0), p(200.0, 0.0), None, None),
        RawRecord::wall(p(200.0, 0.0), p(200.0, 100.0), None, None),
        RawRecord::wall(p(200.0, 100.0), p(3.0, 100.0), None, None),
        RawRecord::wall(p(3.0, 100.0), p(0.0, 0.0), None, None),
    ];
    let config = ParserConfig::default();
    let mut house = House::from_records("skewed.txt", walls);
    house
        .reconstruct(&config, &PipelineOptions::default(), &[])
        .unwrap();

    for (key, _) in house.graph.walls() {
        let (a, b) = house.graph.wall_endpoints(key).unwrap();
        assert!(inclination(&a, &b, config.straighten_walls.cutoff_gradient).is_none());
    }
    assert!(house.graph.find_corner(&p(0.0, 100.0)).is_some());

    assert_eq!(house.rooms.len(), 1);
    let room = house.rooms.iter().next().unwrap();
    assert_relative_eq!(room.polygon(&house.graph).unwrap().unwrap().area(), 20_000.0);
}

#[test]
fn test_annotation_file_reconstruction() {
    let mut text = String::new();
    text += &line(0, 0, 200, 0, "wall");
    text += &line(200, 0, 200, 100, "wall");
    text += &line(200, 100, 0, 100, "wall");
    text += &line(0, 100, 0, 0, "wall");
    text += &line(100, 0, 100, 100, "wall");
    // Internal door, exterior door on the left wall, window on the bottom
    text += &line(100, 40, 100, 60, "door");
    text += &line(0, 40, 0, 60, "door");
    text += &line(30, 0, 50, 0, "door");
    text += &line(1, 40, 5, 60, "entrance");
    text += &line(20, 20, 80, 80, "bedroom");
    text += &line(150, 20, 170, 40, "stairs");

    let options = PipelineOptions {
        source_kind: SourceKind::R2vAnnotation,
        ..PipelineOptions::default()
    };
    let house = reconstruct(
        "annot.txt",
        &text,
        &ParserConfig::default(),
        &options,
        &vocabulary(),
    )
    .unwrap();

    assert_eq!(house.rooms.len(), 2);
    assert_eq!(house.object_annotations.len(), 1);
    assert_eq!(house.object_annotations[0].annotation_type, "stairs");

    let rooms: Vec<_> = house.rooms.iter().collect();
    let (left, right) = if rooms[0].room_types.is_empty() {
        (rooms[1], rooms[0])
    } else {
        (rooms[0], rooms[1])
    };
    assert_eq!(left.room_type_label().as_deref(), Some("bedroom"));
    assert!(right.room_types.is_empty());
    assert!(left.room_id.is_some() && right.room_id.is_some());

    let mut kinds: Vec<(Point2D, Point2D, HoleKind)> = Vec::new();
    for (key, wall) in house.graph.walls() {
        for hole in &wall.holes {
            let (s, e) = house.graph.hole_segment(key, hole).unwrap();
            kinds.push((s, e, hole.kind));
        }
    }
    assert_eq!(kinds.len(), 3);

    let kind_at = |x: f64, y: f64| {
        kinds
            .iter()
            .find(|(s, e, _)| (s.x + e.x) / 2.0 == x && (s.y + e.y) / 2.0 == y)
            .map(|(_, _, k)| *k)
    };
    assert_eq!(kind_at(100.0, 50.0), Some(HoleKind::Door));
    assert_eq!(kind_at(0.0, 50.0), Some(HoleKind::Door));
    assert_eq!(kind_at(40.0, 0.0), Some(HoleKind::Window));

    // Internal door in both directions, exterior door once
    assert_eq!(house.rdr.len(), 3);
    let exterior: Vec<_> = house.rdr.iter().filter(|e| e.target.is_none()).collect();
    assert_eq!(exterior.len(), 1);
    assert_eq!(&exterior[0].source, left.key());

    let internal: Vec<_> = house.rdr.iter().filter(|e| e.target.is_some()).collect();
    assert_eq!(internal.len(), 2);
    assert_eq!(internal[0].hole_id, internal[1].hole_id);
    assert_eq!(internal[0].target.as_ref(), Some(&internal[1].source));
    assert_eq!(internal[1].target.as_ref(), Some(&internal[0].source));
}

#[test]
fn test_opening_round_trip_through_pipeline() {
    let mut house = House::from_records(
        "door.txt",
        [
            split_rectangle_walls(),
            vec![RawRecord::new(
                100.0,
                60.0,
                100.0,
                40.0,
                r2v_floorplan::RecordCategory::Door,
            )],
        ]
        .concat(),
    );
    house
        .reconstruct(&ParserConfig::default(), &PipelineOptions::default(), &[])
        .unwrap();

    let (key, hole) = house
        .graph
        .walls()
        .find_map(|(k, w)| w.holes.first().map(|h| (k, h.clone())))
        .unwrap();
    let (s, e) = house.graph.hole_segment(key, &hole).unwrap();
    assert_relative_eq!(s.x, 100.0);
    assert_relative_eq!(e.x, 100.0);
    assert_relative_eq!(s.y.min(e.y), 40.0);
    assert_relative_eq!(s.y.max(e.y), 60.0);
    assert_eq!(hole.kind, HoleKind::Door);
}

/// Every hole with its host wall, world segment and wall length.
fn hole_segments(house: &House) -> Vec<(WallKey, Hole, Point2D, Point2D, f64)> {
    let graph = &house.graph;
    graph
        .walls()
        .flat_map(|(key, wall)| {
            let length = graph.wall_length(key).unwrap();
            wall.holes.iter().map(move |hole| {
                let (s, e) = graph.hole_segment(key, hole).unwrap();
                (key, hole.clone(), s, e, length)
            })
        })
        .collect()
}

fn reconstruct_with_doors(source: &str, doors: &[(Point2D, Point2D)]) -> House {
    let records = split_rectangle_walls()
        .into_iter()
        .chain(
            doors
                .iter()
                .map(|(a, b)| RawRecord::new(a.x, a.y, b.x, b.y, RecordCategory::Door)),
        )
        .collect();
    let mut house = House::from_records(source, records);
    house
        .reconstruct(&ParserConfig::default(), &PipelineOptions::default(), &[])
        .unwrap();
    house
}

#[test]
fn test_horizontal_openings_round_trip_in_either_order() {
    // Same wall, one opening drawn towards each end
    let house = reconstruct_with_doors(
        "top_doors.txt",
        &[(p(60.0, 0.0), p(30.0, 0.0)), (p(70.0, 0.0), p(90.0, 0.0))],
    );

    let holes = hole_segments(&house);
    assert_eq!(holes.len(), 2);
    assert_eq!(holes[0].0, holes[1].0);

    let mut spans = Vec::new();
    for (_, hole, s, e, length) in &holes {
        assert!(0.0 <= hole.min_x && hole.min_x <= hole.max_x && hole.max_x <= *length);
        assert_relative_eq!(hole.width(), (s.x - e.x).abs());
        assert_relative_eq!(s.y, 0.0);
        assert_relative_eq!(e.y, 0.0);
        spans.push((s.x.min(e.x), s.x.max(e.x)));
    }
    spans.sort_by(|a, b| a.0.total_cmp(&b.0));
    assert_relative_eq!(spans[0].0, 30.0);
    assert_relative_eq!(spans[0].1, 60.0);
    assert_relative_eq!(spans[1].0, 70.0);
    assert_relative_eq!(spans[1].1, 90.0);
}

#[test]
fn test_opening_past_wall_end_is_clamped() {
    let house = reconstruct_with_doors("overhang.txt", &[(p(180.0, 0.0), p(210.0, 0.0))]);

    let holes = hole_segments(&house);
    assert_eq!(holes.len(), 1);
    let (key, hole, s, e, length) = &holes[0];

    let (w1, w2) = house.graph.wall_endpoints(*key).unwrap();
    assert_eq!((w1, w2), (p(100.0, 0.0), p(200.0, 0.0)));
    assert_relative_eq!(*length, 100.0);
    assert_relative_eq!(hole.min_x, 80.0);
    assert_relative_eq!(hole.max_x, 100.0);
    assert_relative_eq!(s.x, 180.0);
    assert_relative_eq!(e.x, 200.0);
}

#[test]
fn test_diagonal_opening_uses_axis_wise_interval() {
    // 3-4-5 wall; the opening covers Euclidean 10..30 along it
    let mut graph = WallLinkageGraph::new(0.5);
    let wall = graph
        .add_wall(p(0.0, 0.0), p(30.0, 40.0), None, None)
        .unwrap()
        .unwrap();
    let opening = (p(18.0, 24.0), p(6.0, 8.0));
    let report = assign_openings(&mut graph, &[opening], 5.0, "diagonal").unwrap();
    assert_eq!(report.assigned.len(), 1);

    // The interval is measured with the axis-wise metric, so the world
    // segment lands short of the drawn opening
    let hole = graph.wall(wall).unwrap().holes[0].clone();
    assert_relative_eq!(hole.min_x, 8.0);
    assert_relative_eq!(hole.max_x, 24.0);

    let (s, e) = graph.hole_segment(wall, &hole).unwrap();
    assert_relative_eq!(s.x, 4.8, epsilon = 1e-9);
    assert_relative_eq!(s.y, 6.4, epsilon = 1e-9);
    assert_relative_eq!(e.x, 14.4, epsilon = 1e-9);
    assert_relative_eq!(e.y, 19.2, epsilon = 1e-9);
}
