//! draw.io (mxGraph) XML generation
//!
//! Pure string building: parsed elements are placed on a deterministic rank
//! grid and written out as an uncompressed mxfile document. Rank advances
//! along the layout direction; siblings within a rank keep declaration
//! order.

use std::collections::VecDeque;

use super::parser::{Diagram, Element, ElementKind, Shape};
use super::ConvertOptions;

/// Vertex size used for every element
const ELEMENT_WIDTH: i64 = 160;
const ELEMENT_HEIGHT: i64 = 80;
/// Frame padding around the members of a boundary
const BOUNDARY_PADDING: i64 = 20;

const BOUNDARY_STYLE: &str =
    "rounded=0;whiteSpace=wrap;html=1;dashed=1;fillColor=none;strokeColor=#444444;verticalAlign=bottom;fontStyle=2;";
const EDGE_STYLE: &str = "edgeStyle=orthogonalEdgeStyle;rounded=0;html=1;jettySize=auto;";
const EDGE_STYLE_BIDIRECTIONAL: &str =
    "edgeStyle=orthogonalEdgeStyle;rounded=0;html=1;jettySize=auto;startArrow=classic;startFill=1;";

const HEADER: &str = concat!(
    "<mxfile host=\"app.diagrams.net\">\n",
    "  <diagram id=\"c4\" name=\"C4 Diagram\">\n",
    "    <mxGraphModel dx=\"1024\" dy=\"768\" grid=\"0\" gridSize=\"10\" guides=\"1\" ",
    "tooltips=\"1\" connect=\"1\" arrows=\"1\" fold=\"1\" page=\"1\" pageScale=\"1\" ",
    "pageWidth=\"1169\" pageHeight=\"826\" math=\"0\" shadow=\"0\">\n",
    "      <root>\n",
    "        <mxCell id=\"0\"/>\n",
    "        <mxCell id=\"1\" parent=\"0\"/>\n",
);
const FOOTER: &str = concat!(
    "      </root>\n",
    "    </mxGraphModel>\n",
    "  </diagram>\n",
    "</mxfile>\n",
);

/// Render a parsed diagram as a draw.io XML document
pub fn render(diagram: &Diagram, options: &ConvertOptions) -> String {
    let positions = place_elements(diagram, options);
    let depths = boundary_depths(diagram);
    let mut xml = String::with_capacity(2048);
    xml.push_str(HEADER);

    // Boundary frames come first so they sit behind their members
    for (index, boundary) in diagram.boundaries.iter().enumerate() {
        if let Some((x, y, width, height)) = boundary_box(diagram, index, &positions, depths[index])
        {
            xml.push_str(&format!(
                "        <mxCell id=\"boundary-{id}\" value=\"{value}\" style=\"{BOUNDARY_STYLE}\" vertex=\"1\" parent=\"1\">\n          <mxGeometry x=\"{x}\" y=\"{y}\" width=\"{width}\" height=\"{height}\" as=\"geometry\"/>\n        </mxCell>\n",
                id = escape_xml(&boundary.alias),
                value = escape_xml(&boundary.label),
            ));
        }
    }

    for (index, element) in diagram.elements.iter().enumerate() {
        let (x, y) = positions[index];
        xml.push_str(&format!(
            "        <mxCell id=\"node-{id}\" value=\"{value}\" style=\"{style}\" vertex=\"1\" parent=\"1\">\n          <mxGeometry x=\"{x}\" y=\"{y}\" width=\"{ELEMENT_WIDTH}\" height=\"{ELEMENT_HEIGHT}\" as=\"geometry\"/>\n        </mxCell>\n",
            id = escape_xml(&element.alias),
            value = escape_xml(&caption(&element.label, element.technology.as_deref())),
            style = style_for(element),
        ));
    }

    for (index, relation) in diagram.relations.iter().enumerate() {
        let style = if relation.bidirectional {
            EDGE_STYLE_BIDIRECTIONAL
        } else {
            EDGE_STYLE
        };
        let label = caption(
            relation.label.as_deref().unwrap_or(""),
            relation.technology.as_deref(),
        );
        xml.push_str(&format!(
            "        <mxCell id=\"edge-{index}\" value=\"{value}\" style=\"{style}\" edge=\"1\" parent=\"1\" source=\"node-{from}\" target=\"node-{to}\">\n          <mxGeometry relative=\"1\" as=\"geometry\"/>\n        </mxCell>\n",
            value = escape_xml(&label),
            from = escape_xml(&diagram.elements[relation.from].alias),
            to = escape_xml(&diagram.elements[relation.to].alias),
        ));
    }

    xml.push_str(FOOTER);
    xml
}

/// Grid placement of every element, honoring direction and spacing options
fn place_elements(diagram: &Diagram, options: &ConvertOptions) -> Vec<(i64, i64)> {
    let ranks = assign_ranks(diagram);
    let max_rank = ranks.iter().copied().max().unwrap_or(0);
    let mut next_slot = vec![0i64; max_rank + 1];

    let nodesep = i64::from(options.nodesep);
    let ranksep = i64::from(options.ranksep);
    let marginx = i64::from(options.marginx);
    let marginy = i64::from(options.marginy);

    ranks
        .iter()
        .map(|&rank| {
            let row = if options.direction.is_reversed() {
                max_rank - rank
            } else {
                rank
            };
            let row = i64::try_from(row).unwrap_or(0);
            let slot = next_slot[rank];
            next_slot[rank] += 1;
            if options.direction.is_horizontal() {
                (
                    marginx + row * (ELEMENT_WIDTH + ranksep),
                    marginy + slot * (ELEMENT_HEIGHT + nodesep),
                )
            } else {
                (
                    marginx + slot * (ELEMENT_WIDTH + nodesep),
                    marginy + row * (ELEMENT_HEIGHT + ranksep),
                )
            }
        })
        .collect()
}

/// Rank assignment by breadth-first traversal from the relation sources
///
/// Elements with no incoming relation seed rank 0; every relation pushes its
/// destination at least one rank further. Elements on cycles never drain
/// from the queue and stay at rank 0.
fn assign_ranks(diagram: &Diagram) -> Vec<usize> {
    let count = diagram.elements.len();
    let mut indegree = vec![0usize; count];
    let mut successors: Vec<Vec<usize>> = vec![Vec::new(); count];
    for relation in &diagram.relations {
        if relation.from != relation.to {
            successors[relation.from].push(relation.to);
            indegree[relation.to] += 1;
        }
    }

    let mut ranks = vec![0usize; count];
    let mut queue: VecDeque<usize> = (0..count).filter(|&index| indegree[index] == 0).collect();
    while let Some(current) = queue.pop_front() {
        for &next in &successors[current] {
            if ranks[next] < ranks[current] + 1 {
                ranks[next] = ranks[current] + 1;
            }
            indegree[next] -= 1;
            if indegree[next] == 0 {
                queue.push_back(next);
            }
        }
    }
    ranks
}

/// Nesting depth beneath each boundary, used to widen outer frames
fn boundary_depths(diagram: &Diagram) -> Vec<i64> {
    let mut depths = vec![0i64; diagram.boundaries.len()];
    // Parents are always declared before children, so a reverse pass settles
    // every depth in one sweep
    for index in (0..diagram.boundaries.len()).rev() {
        if let Some(parent) = diagram.boundaries[index].parent {
            depths[parent] = depths[parent].max(depths[index] + 1);
        }
    }
    depths
}

/// Bounding box of a boundary frame, or None when it has no members
fn boundary_box(
    diagram: &Diagram,
    boundary: usize,
    positions: &[(i64, i64)],
    depth: i64,
) -> Option<(i64, i64, i64, i64)> {
    let mut min_x = i64::MAX;
    let mut min_y = i64::MAX;
    let mut max_x = i64::MIN;
    let mut max_y = i64::MIN;
    let mut members = 0usize;

    for (index, element) in diagram.elements.iter().enumerate() {
        if !encloses(diagram, boundary, element) {
            continue;
        }
        members += 1;
        let (x, y) = positions[index];
        min_x = min_x.min(x);
        min_y = min_y.min(y);
        max_x = max_x.max(x + ELEMENT_WIDTH);
        max_y = max_y.max(y + ELEMENT_HEIGHT);
    }
    if members == 0 {
        return None;
    }

    let pad = BOUNDARY_PADDING * (depth + 1);
    Some((
        min_x - pad,
        min_y - pad,
        (max_x - min_x) + 2 * pad,
        (max_y - min_y) + 2 * pad,
    ))
}

/// Whether an element sits inside a boundary, directly or transitively
fn encloses(diagram: &Diagram, boundary: usize, element: &Element) -> bool {
    let mut current = element.boundary;
    while let Some(index) = current {
        if index == boundary {
            return true;
        }
        current = diagram.boundaries[index].parent;
    }
    false
}

/// Vertex style in the conventional C4 palette
fn style_for(element: &Element) -> String {
    let (fill, stroke, font) = if element.external {
        ("#999999", "#8A8A8A", "#ffffff")
    } else {
        match element.kind {
            ElementKind::Person => ("#08427B", "#073B6F", "#ffffff"),
            ElementKind::System => ("#1168BD", "#0E5CAD", "#ffffff"),
            ElementKind::Container => ("#438DD5", "#3C7FC0", "#ffffff"),
            ElementKind::Component => ("#85BBF0", "#78A8D8", "#000000"),
        }
    };
    let shape = match element.shape {
        Shape::Plain => "rounded=1;whiteSpace=wrap;html=1;",
        Shape::Database => {
            "shape=cylinder3;whiteSpace=wrap;html=1;boundedLbl=1;backgroundOutline=1;size=15;"
        }
        Shape::Queue => "shape=hexagon;perimeter=hexagonPerimeter2;whiteSpace=wrap;html=1;",
    };
    format!("{shape}fillColor={fill};strokeColor={stroke};fontColor={font};")
}

/// Display text: label plus an optional bracketed technology line
fn caption(label: &str, technology: Option<&str>) -> String {
    match technology {
        Some(technology) if !technology.is_empty() => format!("{label}\n[{technology}]"),
        _ => label.to_string(),
    }
}

/// Escape text for use in an XML attribute value
///
/// Newlines become numeric references so multi-line captions survive the
/// attribute round trip.
fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            '\n' => escaped.push_str("&#10;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
