//! Layered auto-layout for graph descriptions.
//!
//! Rank assignment and in-rank ordering come from the Sugiyama implementation
//! in `rust-sugiyama`. This module turns its output into fixed-size box
//! centers and edge polylines, written onto a deep copy of the caller's
//! description.

use std::collections::{HashMap, HashSet};
use std::panic;

use log::debug;
use rust_sugiyama::configure::Config;
use serde::Deserialize;

use super::error::LayoutError;
use super::types::{GraphDescription, Point};

/// Spacing handed to the Sugiyama engine. In-rank coordinates are divided by
/// it to recover slot positions.
const VERTEX_SPACING: f64 = 10.0;

/// Rank flow direction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
pub enum Direction {
	#[default]
	#[serde(rename = "LR")]
	LeftToRight,
	#[serde(rename = "RL")]
	RightToLeft,
	#[serde(rename = "TB")]
	TopToBottom,
	#[serde(rename = "BT")]
	BottomToTop,
}

impl Direction {
	fn is_horizontal(self) -> bool {
		matches!(self, Direction::LeftToRight | Direction::RightToLeft)
	}

	fn is_reversed(self) -> bool {
		matches!(self, Direction::RightToLeft | Direction::BottomToTop)
	}
}

/// Layout configuration. Every node is treated as a box of the same size.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
	pub direction: Direction,
	pub node_width: f64,
	pub node_height: f64,
	/// Gap between adjacent ranks.
	pub rank_sep: f64,
	/// Gap between neighbours within a rank.
	pub node_sep: f64,
}

impl Default for LayoutConfig {
	fn default() -> Self {
		Self {
			direction: Direction::LeftToRight,
			node_width: 150.0,
			node_height: 50.0,
			rank_sep: 50.0,
			node_sep: 50.0,
		}
	}
}

/// Rank and cross-axis slot assigned to one node.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Slot {
	rank: usize,
	cross: f64,
}

/// Lays out `description` and returns an annotated copy.
///
/// Nodes receive center coordinates; edges receive `start_point`, `end_point`
/// and `control_points`. The input is never modified. Fails without partial
/// output when an edge references an unknown node, when ids collide, or when
/// the layout engine itself fails.
pub fn layout(
	description: &GraphDescription,
	config: &LayoutConfig,
) -> Result<GraphDescription, LayoutError> {
	let index = index_nodes(description)?;
	let edges = resolve_edges(description, &index)?;
	let slots = assign_slots(description.nodes.len(), &edges)?;
	let geometry = Geometry::new(config, &slots);

	let mut data = description.clone();
	for (node, slot) in data.nodes.iter_mut().zip(&slots) {
		let center = geometry.center(*slot);
		node.x = Some(center.x);
		node.y = Some(center.y);
	}

	for (edge, &(from, to)) in data.edges.iter_mut().zip(&edges) {
		let points = if from == to {
			geometry.self_loop(slots[from])
		} else {
			geometry.route(slots[from], slots[to])
		};
		edge.start_point = points.first().copied();
		edge.end_point = points.last().copied();
		edge.control_points = points[1..points.len() - 1].to_vec();
	}

	debug!(
		"layout: placed {} nodes and {} edges over {} ranks",
		data.nodes.len(),
		data.edges.len(),
		geometry.max_rank + 1
	);

	Ok(data)
}

fn index_nodes(description: &GraphDescription) -> Result<HashMap<&str, usize>, LayoutError> {
	let mut index = HashMap::with_capacity(description.nodes.len());
	for (i, node) in description.nodes.iter().enumerate() {
		if index.insert(node.id.as_str(), i).is_some() {
			return Err(LayoutError::DuplicateNode(node.id.clone()));
		}
	}
	Ok(index)
}

fn resolve_edges(
	description: &GraphDescription,
	index: &HashMap<&str, usize>,
) -> Result<Vec<(usize, usize)>, LayoutError> {
	description
		.edges
		.iter()
		.map(|edge| {
			let lookup = |id: &String| {
				index
					.get(id.as_str())
					.copied()
					.ok_or_else(|| LayoutError::UnknownNode {
						from: edge.source.clone(),
						to: edge.target.clone(),
						missing: id.clone(),
					})
			};
			Ok((lookup(&edge.source)?, lookup(&edge.target)?))
		})
		.collect()
}

/// Runs the Sugiyama engine and maps its per-component coordinates to slots.
///
/// Components are stacked along the cross axis in the order the engine
/// returns them; nodes without edges follow, one slot each, on rank 0.
fn assign_slots(node_count: usize, edges: &[(usize, usize)]) -> Result<Vec<Slot>, LayoutError> {
	let mut seen = HashSet::new();
	let engine_edges: Vec<(u32, u32)> = edges
		.iter()
		.filter(|&&(from, to)| from != to && seen.insert((from, to)))
		.map(|&(from, to)| (from as u32, to as u32))
		.collect();

	let mut slots: Vec<Option<Slot>> = vec![None; node_count];
	let mut offset = 0.0;

	if !engine_edges.is_empty() {
		let input = engine_edges.clone();
		let layouts = panic::catch_unwind(move || {
			let config = Config {
				minimum_length: 1,
				vertex_spacing: VERTEX_SPACING,
				..Default::default()
			};
			rust_sugiyama::from_edges(&input, &config)
		})
		.map_err(|err| {
			let message = if let Some(msg) = err.downcast_ref::<String>() {
				msg.clone()
			} else if let Some(msg) = err.downcast_ref::<&str>() {
				msg.to_string()
			} else {
				"panicked with unknown error".to_string()
			};
			LayoutError::Engine(message)
		})?;

		if layouts.is_empty() {
			return Err(LayoutError::Engine("no layout returned".to_string()));
		}

		for (coords, _, _) in &layouts {
			let placed: Vec<(usize, f64, f64)> = coords
				.iter()
				.map(|&(id, (x, y))| (id as usize, x as f64, y as f64))
				.filter(|&(id, _, _)| id < node_count)
				.collect();
			offset = place_component(&placed, &engine_edges, &mut slots, offset);
		}
	}

	Ok(slots
		.into_iter()
		.map(|slot| {
			slot.unwrap_or_else(|| {
				let isolated = Slot {
					rank: 0,
					cross: offset,
				};
				offset += 1.0;
				isolated
			})
		})
		.collect())
}

/// Writes slots for one connected component and returns the next free
/// cross-axis offset.
fn place_component(
	placed: &[(usize, f64, f64)],
	edges: &[(u32, u32)],
	slots: &mut [Option<Slot>],
	offset: f64,
) -> f64 {
	if placed.is_empty() {
		return offset;
	}

	let levels: HashMap<usize, f64> = placed.iter().map(|&(id, _, y)| (id, y)).collect();

	// Orient the rank axis so that sources precede targets.
	let balance: f64 = edges
		.iter()
		.filter_map(|&(from, to)| Some(levels.get(&(to as usize))? - levels.get(&(from as usize))?))
		.sum();
	let sign = if balance < 0.0 { -1.0 } else { 1.0 };

	let mut ranks: Vec<f64> = placed.iter().map(|&(_, _, y)| y * sign).collect();
	ranks.sort_by(f64::total_cmp);
	ranks.dedup_by(|a, b| (*a - *b).abs() < 1e-6);

	let min_cross = placed
		.iter()
		.map(|&(_, x, _)| x)
		.fold(f64::INFINITY, f64::min);
	let mut max_cross: f64 = 0.0;

	for &(id, x, y) in placed {
		let rank = ranks.partition_point(|&level| level < y * sign - 1e-6);
		let cross = (x - min_cross) / VERTEX_SPACING;
		max_cross = max_cross.max(cross);
		slots[id] = Some(Slot {
			rank,
			cross: offset + cross,
		});
	}

	offset + max_cross + 1.0
}

/// Converts slots to canvas coordinates.
struct Geometry {
	direction: Direction,
	main_size: f64,
	cross_size: f64,
	rank_sep: f64,
	node_sep: f64,
	max_rank: usize,
}

impl Geometry {
	fn new(config: &LayoutConfig, slots: &[Slot]) -> Self {
		let (main_size, cross_size) = if config.direction.is_horizontal() {
			(config.node_width, config.node_height)
		} else {
			(config.node_height, config.node_width)
		};
		Self {
			direction: config.direction,
			main_size,
			cross_size,
			rank_sep: config.rank_sep,
			node_sep: config.node_sep,
			max_rank: slots.iter().map(|slot| slot.rank).max().unwrap_or(0),
		}
	}

	fn main_of(&self, rank: usize) -> f64 {
		let rank = if self.direction.is_reversed() {
			self.max_rank - rank
		} else {
			rank
		};
		rank as f64 * (self.main_size + self.rank_sep) + self.main_size / 2.0
	}

	fn cross_of(&self, cross: f64) -> f64 {
		cross * (self.cross_size + self.node_sep) + self.cross_size / 2.0
	}

	fn point(&self, main: f64, cross: f64) -> Point {
		if self.direction.is_horizontal() {
			Point::new(main, cross)
		} else {
			Point::new(cross, main)
		}
	}

	fn center(&self, slot: Slot) -> Point {
		self.point(self.main_of(slot.rank), self.cross_of(slot.cross))
	}

	/// Polyline from the source box border to the target box border, bending
	/// once per intermediate rank.
	fn route(&self, from: Slot, to: Slot) -> Vec<Point> {
		let (from_main, from_cross) = (self.main_of(from.rank), self.cross_of(from.cross));
		let (to_main, to_cross) = (self.main_of(to.rank), self.cross_of(to.cross));

		if from.rank == to.rank {
			let half = self.cross_size / 2.0;
			let step = if to_cross >= from_cross { 1.0 } else { -1.0 };
			return vec![
				self.point(from_main, from_cross + step * half),
				self.point(to_main, to_cross - step * half),
			];
		}

		let half = self.main_size / 2.0;
		let step = if to_main > from_main { 1.0 } else { -1.0 };
		let mut points = vec![self.point(from_main + step * half, from_cross)];

		let between: Vec<usize> = if from.rank < to.rank {
			(from.rank + 1..to.rank).collect()
		} else {
			(to.rank + 1..from.rank).rev().collect()
		};
		let span = to.rank as f64 - from.rank as f64;
		for rank in between {
			let t = (rank as f64 - from.rank as f64) / span;
			points.push(self.point(self.main_of(rank), from_cross + (to_cross - from_cross) * t));
		}

		points.push(self.point(to_main - step * half, to_cross));
		points
	}

	fn self_loop(&self, slot: Slot) -> Vec<Point> {
		let (main, cross) = (self.main_of(slot.rank), self.cross_of(slot.cross));
		let half = self.main_size / 2.0;
		let reach = half + self.rank_sep / 2.0;
		vec![
			self.point(main + half, cross),
			self.point(main + reach, cross - self.cross_size),
			self.point(main - reach, cross - self.cross_size),
			self.point(main - half, cross),
		]
	}
}
