//! Grid A* with dynamic-obstacle awareness, plus BFS reachability helpers.
//!
//! The planner treats two blocker sets differently: the static set (zones,
//! rocks) is permanent; the dynamic set (cells currently occupied by other
//! agents) is advisory. If no path exists while honoring dynamic blockers,
//! the search retries with the static set alone so agents cannot deadlock
//! each other. The goal cell is never excluded by either set — an agent may
//! always path onto an occupied rendezvous point.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet, VecDeque};

use crate::grid::{Cell, GridSpec};

/// Find a path from `start` to `goal`, honoring both blocker sets.
///
/// Returns the waypoint cells to visit in order, excluding `start` (unless
/// start == goal, which yields the single-cell trivial path). Returns `None`
/// when `start` itself is blocked or no route exists even ignoring dynamic
/// blockers.
pub fn find_path(
    grid: &GridSpec,
    blocked: &HashSet<Cell>,
    dynamic: &HashSet<Cell>,
    start: Cell,
    goal: Cell,
) -> Option<Vec<Cell>> {
    if start == goal {
        return Some(vec![goal]);
    }
    if blocked.contains(&start) {
        return None;
    }

    let mut path = astar(grid, blocked, Some(dynamic), start, goal);
    if path.is_none() && !dynamic.is_empty() {
        // Deadlock breaker: other agents will move eventually.
        path = astar(grid, blocked, None, start, goal);
    }

    path.map(|mut cells| {
        if cells.first() == Some(&start) {
            cells.remove(0);
        }
        cells
    })
}

/// 4-connected A* with Manhattan heuristic and unit edge cost. Ties on
/// f-score break by discovery order so path shape is stable.
fn astar(
    grid: &GridSpec,
    blocked: &HashSet<Cell>,
    dynamic: Option<&HashSet<Cell>>,
    start: Cell,
    goal: Cell,
) -> Option<Vec<Cell>> {
    let mut open: BinaryHeap<Reverse<(i32, u64, Cell)>> = BinaryHeap::new();
    let mut came_from: HashMap<Cell, Cell> = HashMap::new();
    let mut g_score: HashMap<Cell, i32> = HashMap::new();
    let mut seq: u64 = 0;

    g_score.insert(start, 0);
    open.push(Reverse((start.manhattan(&goal), seq, start)));

    while let Some(Reverse((_, _, current))) = open.pop() {
        if current == goal {
            return Some(reconstruct(&came_from, current));
        }
        let current_g = *g_score.get(&current).unwrap_or(&i32::MAX);

        for neighbor in current.neighbors() {
            if !grid.contains(neighbor) {
                continue;
            }
            if neighbor != goal {
                if blocked.contains(&neighbor) {
                    continue;
                }
                if let Some(dyn_set) = dynamic {
                    if dyn_set.contains(&neighbor) {
                        continue;
                    }
                }
            }
            let tentative = current_g.saturating_add(1);
            if tentative >= *g_score.get(&neighbor).unwrap_or(&i32::MAX) {
                continue;
            }
            came_from.insert(neighbor, current);
            g_score.insert(neighbor, tentative);
            seq += 1;
            open.push(Reverse((tentative + neighbor.manhattan(&goal), seq, neighbor)));
        }
    }

    None
}

fn reconstruct(came_from: &HashMap<Cell, Cell>, goal: Cell) -> Vec<Cell> {
    let mut path = vec![goal];
    let mut current = goal;
    while let Some(&prev) = came_from.get(&current) {
        path.push(prev);
        current = prev;
    }
    path.reverse();
    path
}

/// All cells reachable from `start` through non-blocked cells.
pub fn flood_fill(grid: &GridSpec, blocked: &HashSet<Cell>, start: Cell) -> HashSet<Cell> {
    let mut visited = HashSet::new();
    if !grid.contains(start) || blocked.contains(&start) {
        return visited;
    }
    let mut queue = VecDeque::new();
    visited.insert(start);
    queue.push_back(start);

    while let Some(cell) = queue.pop_front() {
        for neighbor in cell.neighbors() {
            if grid.contains(neighbor)
                && !blocked.contains(&neighbor)
                && visited.insert(neighbor)
            {
                queue.push_back(neighbor);
            }
        }
    }

    visited
}

/// BFS outward from `start` for the closest walkable in-bounds cell.
/// Falls back to (1, 1) if the whole grid is somehow blocked.
pub fn nearest_walkable(grid: &GridSpec, blocked: &HashSet<Cell>, start: Cell) -> Cell {
    let mut queue = VecDeque::new();
    let mut visited = HashSet::new();
    queue.push_back(start);
    visited.insert(start);

    while let Some(cell) = queue.pop_front() {
        if grid.contains(cell) && !blocked.contains(&cell) {
            return cell;
        }
        for neighbor in cell.neighbors() {
            if grid.contains(neighbor) && visited.insert(neighbor) {
                queue.push_back(neighbor);
            }
        }
    }

    Cell::new(1, 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> GridSpec {
        GridSpec::new(10, 10, 30.0)
    }

    fn cells(pairs: &[(i32, i32)]) -> HashSet<Cell> {
        pairs.iter().map(|&(c, r)| Cell::new(c, r)).collect()
    }

    #[test]
    fn trivial_path_when_start_is_goal() {
        let path = find_path(
            &grid(),
            &HashSet::new(),
            &HashSet::new(),
            Cell::new(3, 3),
            Cell::new(3, 3),
        )
        .unwrap();
        assert_eq!(path, vec![Cell::new(3, 3)]);
    }

    #[test]
    fn straight_line_excludes_start() {
        let path = find_path(
            &grid(),
            &HashSet::new(),
            &HashSet::new(),
            Cell::new(0, 0),
            Cell::new(0, 5),
        )
        .unwrap();
        assert_eq!(path.len(), 5);
        assert_eq!(*path.last().unwrap(), Cell::new(0, 5));
        assert!(!path.contains(&Cell::new(0, 0)));
    }

    #[test]
    fn waypoints_are_pairwise_adjacent() {
        let path = find_path(
            &grid(),
            &HashSet::new(),
            &HashSet::new(),
            Cell::new(1, 1),
            Cell::new(8, 6),
        )
        .unwrap();
        assert_eq!(path[0].manhattan(&Cell::new(1, 1)), 1);
        for pair in path.windows(2) {
            assert_eq!(pair[0].manhattan(&pair[1]), 1);
        }
        assert_eq!(*path.last().unwrap(), Cell::new(8, 6));
    }

    #[test]
    fn routes_around_static_wall() {
        // Vertical wall at col 5 with a gap at row 9
        let blocked: HashSet<Cell> = (0..9).map(|r| Cell::new(5, r)).collect();
        let path = find_path(
            &grid(),
            &blocked,
            &HashSet::new(),
            Cell::new(0, 0),
            Cell::new(9, 0),
        )
        .unwrap();
        for cell in &path {
            assert!(!blocked.contains(cell), "path crossed wall at {:?}", cell);
        }
        assert_eq!(*path.last().unwrap(), Cell::new(9, 0));
    }

    #[test]
    fn blocked_goal_is_still_enterable() {
        let blocked = cells(&[(4, 4)]);
        let path = find_path(
            &grid(),
            &blocked,
            &HashSet::new(),
            Cell::new(0, 4),
            Cell::new(4, 4),
        )
        .unwrap();
        assert_eq!(*path.last().unwrap(), Cell::new(4, 4));
    }

    #[test]
    fn blocked_start_fails() {
        let blocked = cells(&[(0, 0)]);
        let path = find_path(
            &grid(),
            &blocked,
            &HashSet::new(),
            Cell::new(0, 0),
            Cell::new(5, 5),
        );
        assert!(path.is_none());
    }

    #[test]
    fn fully_walled_goal_fails() {
        // All four neighbors of the goal are statically blocked: the goal
        // itself is exempt from blocking, but nothing can step next to it.
        let blocked = cells(&[(3, 4), (5, 4), (4, 3), (4, 5)]);
        let path = find_path(
            &grid(),
            &blocked,
            &HashSet::new(),
            Cell::new(0, 0),
            Cell::new(4, 4),
        );
        assert!(path.is_none());
    }

    #[test]
    fn dynamic_blockers_divert_the_path() {
        // Corridor of height 2; an agent sits in the straight lane.
        let dynamic = cells(&[(2, 0)]);
        let path = find_path(
            &grid(),
            &HashSet::new(),
            &dynamic,
            Cell::new(0, 0),
            Cell::new(4, 0),
        )
        .unwrap();
        assert!(!path.contains(&Cell::new(2, 0)));
    }

    #[test]
    fn agent_wall_falls_back_to_static_only() {
        // Dynamic agents block every cell of row 1 — statically the grid is
        // open, so the fallback must still find a route through them.
        let dynamic: HashSet<Cell> = (0..10).map(|c| Cell::new(c, 1)).collect();
        let path = find_path(
            &grid(),
            &HashSet::new(),
            &dynamic,
            Cell::new(0, 0),
            Cell::new(0, 3),
        )
        .unwrap();
        assert_eq!(*path.last().unwrap(), Cell::new(0, 3));
    }

    #[test]
    fn dynamic_goal_occupant_does_not_block_arrival() {
        let dynamic = cells(&[(3, 0)]);
        let path = find_path(
            &grid(),
            &HashSet::new(),
            &dynamic,
            Cell::new(0, 0),
            Cell::new(3, 0),
        )
        .unwrap();
        assert_eq!(*path.last().unwrap(), Cell::new(3, 0));
    }

    #[test]
    fn flood_fill_respects_walls() {
        // Wall splitting the grid in two
        let blocked: HashSet<Cell> = (0..10).map(|r| Cell::new(5, r)).collect();
        let reachable = flood_fill(&grid(), &blocked, Cell::new(0, 0));
        assert!(reachable.contains(&Cell::new(4, 9)));
        assert!(!reachable.contains(&Cell::new(6, 0)));
    }

    #[test]
    fn nearest_walkable_escapes_blocked_start() {
        let blocked = cells(&[(5, 5), (6, 5)]);
        let found = nearest_walkable(&grid(), &blocked, Cell::new(5, 5));
        assert!(!blocked.contains(&found));
        assert!(found.manhattan(&Cell::new(5, 5)) <= 2);
    }
}
