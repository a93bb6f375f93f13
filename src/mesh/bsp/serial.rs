//! Serial implementation of BSP operations

use crate::mesh::bsp::node::Node;
use crate::mesh::bsp::traits::{BalancedSplittingStrategy, BspOps, SplittingPlaneStrategy};
use crate::mesh::polygon::Polygon;
use std::fmt::Debug;
use std::marker::PhantomData;

/// Serial implementation of BSP operations
pub struct SerialBspOps<SP: SplittingPlaneStrategy<S> = BalancedSplittingStrategy, S: Clone = ()> {
    splitting_strategy: SP,
    _phantom: PhantomData<S>,
}

impl<S: Clone> Default for SerialBspOps<BalancedSplittingStrategy, S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Clone> SerialBspOps<BalancedSplittingStrategy, S> {
    pub fn new() -> Self {
        Self {
            splitting_strategy: BalancedSplittingStrategy::default(),
            _phantom: PhantomData,
        }
    }
}

impl<SP: SplittingPlaneStrategy<S>, S: Clone> SerialBspOps<SP, S> {
    pub const fn with_strategy(strategy: SP) -> Self {
        Self {
            splitting_strategy: strategy,
            _phantom: PhantomData,
        }
    }
}

impl<SP: SplittingPlaneStrategy<S>, S: Clone + Send + Sync + Debug> BspOps<S>
    for SerialBspOps<SP, S>
{
    fn invert(&self, node: &mut Node<S>) {
        let mut stack = vec![node];

        while let Some(current) = stack.pop() {
            current.polygons.iter_mut().for_each(|p| p.flip());
            if let Some(ref mut plane) = current.plane {
                plane.flip();
            }

            std::mem::swap(&mut current.front, &mut current.back);

            if let Some(ref mut front) = current.front {
                stack.push(front.as_mut());
            }
            if let Some(ref mut back) = current.back {
                stack.push(back.as_mut());
            }
        }
    }

    fn clip_polygons(&self, node: &Node<S>, polygons: &[Polygon<S>]) -> Vec<Polygon<S>> {
        let mut result = Vec::new();
        let mut stack = vec![(node, polygons.to_vec())];

        while let Some((current, polygons)) = stack.pop() {
            if polygons.is_empty() {
                continue;
            }
            let Some(plane) = current.plane.as_ref() else {
                result.extend(polygons);
                continue;
            };

            let mut front_polys = Vec::with_capacity(polygons.len());
            let mut back_polys = Vec::with_capacity(polygons.len());

            for polygon in &polygons {
                let (coplanar_front, coplanar_back, mut front_parts, mut back_parts) =
                    plane.split_polygon(polygon);

                front_polys.extend(coplanar_front);
                front_polys.append(&mut front_parts);
                back_polys.extend(coplanar_back);
                back_polys.append(&mut back_parts);
            }

            // Without a back subtree everything behind the plane is inside: drop it
            if let Some(back_node) = current.back.as_deref() {
                stack.push((back_node, back_polys));
            }
            // pushed last so front parts come out ahead of back parts
            match current.front.as_deref() {
                Some(front_node) => stack.push((front_node, front_polys)),
                None => result.extend(front_polys),
            }
        }

        result
    }

    fn clip_to(&self, node: &mut Node<S>, bsp: &Node<S>) {
        let mut stack = vec![node];

        while let Some(current) = stack.pop() {
            current.polygons = self.clip_polygons(bsp, &current.polygons);

            if let Some(front) = current.front.as_deref_mut() {
                stack.push(front);
            }
            if let Some(back) = current.back.as_deref_mut() {
                stack.push(back);
            }
        }
    }

    fn all_polygons(&self, node: &Node<S>) -> Vec<Polygon<S>> {
        let mut result = Vec::new();
        let mut stack = vec![node];

        while let Some(current) = stack.pop() {
            result.extend_from_slice(&current.polygons);

            stack.extend(
                [&current.front, &current.back]
                    .iter()
                    .filter_map(|child| child.as_ref().map(|boxed| boxed.as_ref())),
            );
        }
        result
    }

    fn build(&self, node: &mut Node<S>, polygons: &[Polygon<S>]) {
        let mut stack = vec![(node, polygons.to_vec())];

        while let Some((current, polygons)) = stack.pop() {
            if polygons.is_empty() {
                continue;
            }
            let Node {
                plane,
                front,
                back,
                polygons: coplanar,
            } = current;

            let plane = plane
                .get_or_insert_with(|| self.splitting_strategy.pick_best_splitting_plane(&polygons))
                .clone();

            let mut front_polys = Vec::with_capacity(polygons.len() / 2);
            let mut back_polys = Vec::with_capacity(polygons.len() / 2);

            for polygon in &polygons {
                let (coplanar_front, coplanar_back, mut front_parts, mut back_parts) =
                    plane.split_polygon(polygon);

                coplanar.extend(coplanar_front);
                coplanar.extend(coplanar_back);
                front_polys.append(&mut front_parts);
                back_polys.append(&mut back_parts);
            }

            if !front_polys.is_empty() {
                let front_node = front.get_or_insert_with(|| Box::new(Node::new()));
                stack.push((front_node.as_mut(), front_polys));
            }
            if !back_polys.is_empty() {
                let back_node = back.get_or_insert_with(|| Box::new(Node::new()));
                stack.push((back_node.as_mut(), back_polys));
            }
        }
    }
}
