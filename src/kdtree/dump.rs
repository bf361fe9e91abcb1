//! Plain-text persistence and debug printing of trees.
//!
//! A dump looks like
//!
//! ```text
//! #ANN 1.1.2
//! points <dimension> <count>
//! <index> <coord_0> ... <coord_{d-1}>
//! tree <dimension> <count> <bucket_size>
//! <low bound coords>
//! <high bound coords>
//! <nodes>
//! ```
//!
//! where nodes are written in preorder as `null` (empty tree), `leaf <n> <idx>...`,
//! `split <axis> <cut> <low bound> <high bound>` followed by the low and high child, or
//! `shrink <m>` followed by `m` lines `<axis> <cut> <side>` and the inside and outside child.

use std::io::{BufRead, Lines, Write};
use std::str::FromStr;

use crate::error::{AnnError, Result};
use crate::kdtree::constants::DUMP_VERSION;
use crate::kdtree::node::{Node, NodeId};
use crate::kdtree::points::PointSet;
use crate::kdtree::rect::{HalfSpace, HalfSpaces, Rect};
use crate::kdtree::{KDTree, TreeKind};
use crate::r#type::AnnNum;

fn write_coords<N: AnnNum>(writer: &mut impl Write, coords: &[N]) -> Result<()> {
    for (i, c) in coords.iter().enumerate() {
        if i > 0 {
            write!(writer, " ")?;
        }
        write!(writer, "{}", c)?;
    }
    Ok(())
}

impl<N: AnnNum> KDTree<N> {
    /// Write the tree in the plain-text dump format.
    ///
    /// [`KDTree::read_dump`] requires the points, so pass `with_points = true` to be able to
    /// load the dump again.
    pub fn dump(&self, writer: &mut impl Write, with_points: bool) -> Result<()> {
        writeln!(writer, "#ANN {}", DUMP_VERSION)?;
        if with_points {
            writeln!(
                writer,
                "points {} {}",
                self.dimension(),
                self.num_points()
            )?;
            for (i, point) in self.points.iter().enumerate() {
                write!(writer, "{} ", i)?;
                write_coords(writer, point)?;
                writeln!(writer)?;
            }
        }

        writeln!(
            writer,
            "tree {} {} {}",
            self.dimension(),
            self.num_points(),
            self.bucket_size
        )?;
        write_coords(writer, self.bounds.lo())?;
        writeln!(writer)?;
        write_coords(writer, self.bounds.hi())?;
        writeln!(writer)?;

        match self.root {
            Some(root) => self.dump_node(writer, root),
            None => {
                writeln!(writer, "null")?;
                Ok(())
            }
        }
    }

    fn dump_node(&self, writer: &mut impl Write, id: NodeId) -> Result<()> {
        match self.node(id) {
            Node::Leaf { .. } => {
                let bucket = self.bucket(id);
                write!(writer, "leaf {}", bucket.len())?;
                for idx in bucket {
                    write!(writer, " {}", idx)?;
                }
                writeln!(writer)?;
            }
            Node::Split {
                axis,
                cut,
                lo_bound,
                hi_bound,
                low,
                high,
            } => {
                writeln!(writer, "split {} {} {} {}", axis, cut, lo_bound, hi_bound)?;
                self.dump_node(writer, *low)?;
                self.dump_node(writer, *high)?;
            }
            Node::Shrink {
                bounds,
                inside,
                outside,
            } => {
                writeln!(writer, "shrink {}", bounds.len())?;
                for bound in bounds.iter() {
                    writeln!(writer, "{} {} {}", bound.axis, bound.cut, bound.side)?;
                }
                self.dump_node(writer, *inside)?;
                self.dump_node(writer, *outside)?;
            }
        }
        Ok(())
    }

    /// Load a tree written by [`KDTree::dump`].
    ///
    /// `kind` decides whether shrink nodes are legal. The dump must include its points.
    pub fn read_dump(reader: impl BufRead, kind: TreeKind) -> Result<KDTree<N>> {
        let mut reader = DumpReader::new(reader);

        let header = reader.next_tokens()?;
        if !header[0].starts_with("#ANN") {
            return Err(reader.error("incorrect header for dump file"));
        }

        let section = reader.next_tokens()?;
        if !section[0].eq_ignore_ascii_case("points") {
            return Err(reader.error("points must be supplied in the dump file"));
        }
        reader.expect_len(&section, 3)?;
        let dimension: usize = reader.parse(&section[1], "dimension")?;
        let num_points: usize = reader.parse(&section[2], "point count")?;
        if dimension == 0 {
            return Err(reader.error("dimension must be at least 1"));
        }

        if num_points > u32::MAX as usize || dimension.checked_mul(num_points).is_none() {
            return Err(reader.error(format!(
                "{} points of dimension {} cannot be indexed",
                num_points, dimension
            )));
        }

        // Rows are collected in file order and placed once all of them were read, so memory
        // grows with the input rather than with the header.
        let mut rows: Vec<(usize, Vec<N>)> = vec![];
        for _ in 0..num_points {
            let tokens = reader.next_tokens()?;
            if tokens.len() - 1 != dimension {
                return Err(reader.error(format!(
                    "expected {} coordinates, found {}",
                    dimension,
                    tokens.len() - 1
                )));
            }
            let idx: usize = reader.parse(&tokens[0], "point index")?;
            if idx >= num_points {
                return Err(reader.error(format!("point index {} is out of range", idx)));
            }
            let row = tokens[1..]
                .iter()
                .map(|token| reader.parse(token, "coordinate"))
                .collect::<Result<Vec<N>>>()?;
            rows.push((idx, row));
        }
        let mut coords = vec![N::zero(); dimension * num_points];
        for (idx, row) in rows {
            coords[idx * dimension..(idx + 1) * dimension].copy_from_slice(&row);
        }
        let points = PointSet::try_new(dimension, coords)?;

        let section = reader.next_tokens()?;
        if section[0] != "tree" {
            return Err(reader.error("expecting tree section heading"));
        }
        reader.expect_len(&section, 4)?;
        let tree_dimension: usize = reader.parse(&section[1], "dimension")?;
        let tree_points: usize = reader.parse(&section[2], "point count")?;
        let bucket_size: usize = reader.parse(&section[3], "bucket size")?;
        if tree_dimension != dimension || tree_points != num_points {
            return Err(reader.error(format!(
                "tree header ({} x {}) does not match points header ({} x {})",
                tree_dimension, tree_points, dimension, num_points
            )));
        }
        if bucket_size == 0 {
            return Err(AnnError::InvalidBucketSize);
        }

        let lo = reader.parse_coords(dimension)?;
        let hi = reader.parse_coords(dimension)?;

        let mut nodes = NodeReader {
            reader,
            kind,
            dimension,
            num_points,
            indices: Vec::with_capacity(num_points),
            seen: vec![false; num_points],
            nodes: vec![Node::EMPTY_LEAF],
        };
        let root = nodes.read_root()?;
        let NodeReader { indices, nodes, .. } = nodes;

        if indices.len() != num_points {
            log::warn!(
                "Didn't see as many points as expected: dump references {} of {} points",
                indices.len(),
                num_points
            );
        }

        Ok(KDTree {
            kind,
            points,
            indices,
            nodes,
            root,
            bounds: Rect::new(lo, hi),
            bucket_size,
        })
    }

    /// Write an indented, human readable rendition of the tree.
    ///
    /// The high side of each split is printed above its low side, and the outside of each
    /// shrink above its inside.
    pub fn print(&self, writer: &mut impl Write, with_points: bool) -> Result<()> {
        writeln!(writer, "ANN Version {}", DUMP_VERSION)?;
        if with_points {
            writeln!(writer, "    Points:")?;
            for (i, point) in self.points.iter().enumerate() {
                write!(writer, "\t{}: ", i)?;
                write_coords(writer, point)?;
                writeln!(writer)?;
            }
        }
        match self.root {
            Some(root) => self.print_node(writer, root, 0),
            None => {
                writeln!(writer, "    Null tree.")?;
                Ok(())
            }
        }
    }

    fn print_node(&self, writer: &mut impl Write, id: NodeId, level: usize) -> Result<()> {
        let indent = format!("    {}", "..".repeat(level));
        match self.node(id) {
            Node::Leaf { .. } => {
                if id.is_empty_leaf() {
                    writeln!(writer, "{}Leaf (trivial)", indent)?;
                } else {
                    let bucket = self
                        .bucket(id)
                        .iter()
                        .map(|idx| idx.to_string())
                        .collect::<Vec<_>>()
                        .join(",");
                    writeln!(writer, "{}Leaf n={} <{}>", indent, self.bucket(id).len(), bucket)?;
                }
            }
            Node::Split {
                axis,
                cut,
                lo_bound,
                hi_bound,
                low,
                high,
            } => {
                self.print_node(writer, *high, level + 1)?;
                writeln!(
                    writer,
                    "{}Split cd={} cv={} lbnd={} hbnd={}",
                    indent, axis, cut, lo_bound, hi_bound
                )?;
                self.print_node(writer, *low, level + 1)?;
            }
            Node::Shrink {
                bounds,
                inside,
                outside,
            } => {
                self.print_node(writer, *outside, level + 1)?;
                write!(writer, "{}Shrink", indent)?;
                for (j, bound) in bounds.iter().enumerate() {
                    // two half-spaces per line
                    if j % 2 == 0 {
                        write!(writer, "\n{}", "  ".repeat(level + 2))?;
                    }
                    let op = if bound.side > 0 { ">=" } else { "<" };
                    write!(writer, "  ([{}] {} {})", bound.axis, op, bound.cut)?;
                }
                writeln!(writer)?;
                self.print_node(writer, *inside, level + 1)?;
            }
        }
        Ok(())
    }
}

/// Line-oriented tokenizer over a dump, tracking line numbers for error messages.
struct DumpReader<R: BufRead> {
    lines: Lines<R>,
    line: usize,
}

impl<R: BufRead> DumpReader<R> {
    fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line: 0,
        }
    }

    fn error(&self, message: impl Into<String>) -> AnnError {
        AnnError::Parse {
            line: self.line,
            message: message.into(),
        }
    }

    /// The whitespace separated tokens of the next non-blank line.
    fn next_tokens(&mut self) -> Result<Vec<String>> {
        loop {
            let Some(line) = self.lines.next() else {
                return Err(self.error("unexpected end of dump"));
            };
            let line = line?;
            self.line += 1;
            let tokens: Vec<String> = line.split_whitespace().map(String::from).collect();
            if !tokens.is_empty() {
                return Ok(tokens);
            }
        }
    }

    fn expect_len(&self, tokens: &[String], len: usize) -> Result<()> {
        if tokens.len() != len {
            return Err(self.error(format!(
                "expected {} tokens, found {}",
                len,
                tokens.len()
            )));
        }
        Ok(())
    }

    fn parse<T: FromStr>(&self, token: &str, what: &str) -> Result<T> {
        token
            .parse()
            .map_err(|_| self.error(format!("invalid {}: {:?}", what, token)))
    }

    fn parse_coords<N: AnnNum>(&mut self, dimension: usize) -> Result<Vec<N>> {
        let tokens = self.next_tokens()?;
        self.expect_len(&tokens, dimension)?;
        tokens
            .iter()
            .map(|token| self.parse(token, "bound"))
            .collect()
    }
}

/// Rebuilds the node arena from the node section of a dump.
struct NodeReader<R: BufRead, N: AnnNum> {
    reader: DumpReader<R>,
    kind: TreeKind,
    dimension: usize,
    num_points: usize,
    indices: Vec<u32>,
    /// Points already referenced by a leaf.
    seen: Vec<bool>,
    nodes: Vec<Node<N>>,
}

impl<R: BufRead, N: AnnNum> NodeReader<R, N> {
    fn read_root(&mut self) -> Result<Option<NodeId>> {
        let tokens = self.reader.next_tokens()?;
        if tokens[0].eq_ignore_ascii_case("null") {
            return Ok(None);
        }
        self.read_node(tokens).map(Some)
    }

    fn read_child(&mut self) -> Result<NodeId> {
        let tokens = self.reader.next_tokens()?;
        self.read_node(tokens)
    }

    fn push(&mut self, node: Node<N>) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    fn parse_axis(&self, token: &str) -> Result<usize> {
        let axis: usize = self.reader.parse(token, "axis")?;
        if axis >= self.dimension {
            return Err(self.reader.error(format!(
                "axis {} out of range for dimension {}",
                axis, self.dimension
            )));
        }
        Ok(axis)
    }

    fn read_node(&mut self, tokens: Vec<String>) -> Result<NodeId> {
        match tokens[0].to_ascii_lowercase().as_str() {
            "leaf" => {
                if tokens.len() < 2 {
                    return Err(self.reader.error("missing leaf size"));
                }
                let len: usize = self.reader.parse(&tokens[1], "leaf size")?;
                if len == 0 {
                    return Ok(NodeId::EMPTY);
                }
                if len > self.num_points - self.indices.len() {
                    return Err(self.reader.error("more point indices than points"));
                }
                self.reader.expect_len(&tokens, len + 2)?;
                let start = self.indices.len() as u32;
                for token in &tokens[2..] {
                    let idx: u32 = self.reader.parse(token, "point index")?;
                    if idx as usize >= self.num_points {
                        return Err(self
                            .reader
                            .error(format!("point index {} is out of range", idx)));
                    }
                    if std::mem::replace(&mut self.seen[idx as usize], true) {
                        return Err(self
                            .reader
                            .error(format!("point index {} appears in more than one leaf", idx)));
                    }
                    self.indices.push(idx);
                }
                Ok(self.push(Node::Leaf {
                    start,
                    len: len as u32,
                }))
            }
            "split" => {
                self.reader.expect_len(&tokens, 5)?;
                let axis = self.parse_axis(&tokens[1])?;
                let cut: N = self.reader.parse(&tokens[2], "cutting value")?;
                let lo_bound: N = self.reader.parse(&tokens[3], "lower bound")?;
                let hi_bound: N = self.reader.parse(&tokens[4], "upper bound")?;
                let low = self.read_child()?;
                let high = self.read_child()?;
                Ok(self.push(Node::Split {
                    axis,
                    cut,
                    lo_bound,
                    hi_bound,
                    low,
                    high,
                }))
            }
            "shrink" => {
                if self.kind != TreeKind::BoxDecomposition {
                    return Err(AnnError::ShrinkInKdTree {
                        line: self.reader.line,
                    });
                }
                self.reader.expect_len(&tokens, 2)?;
                let num_bounds: usize = self.reader.parse(&tokens[1], "bound count")?;
                let mut bounds = HalfSpaces::<N>::new();
                for _ in 0..num_bounds {
                    let tokens = self.reader.next_tokens()?;
                    self.reader.expect_len(&tokens, 3)?;
                    let axis = self.parse_axis(&tokens[0])?;
                    let cut: N = self.reader.parse(&tokens[1], "cutting value")?;
                    let side: i8 = self.reader.parse(&tokens[2], "side")?;
                    if side != 1 && side != -1 {
                        return Err(self.reader.error(format!("invalid side {}", side)));
                    }
                    bounds.push(HalfSpace { axis, cut, side });
                }
                let inside = self.read_child()?;
                let outside = self.read_child()?;
                Ok(self.push(Node::Shrink {
                    bounds,
                    inside,
                    outside,
                }))
            }
            "null" => Err(self.reader.error("null node below the root")),
            other => Err(self
                .reader
                .error(format!("illegal node type {:?} in dump file", other))),
        }
    }
}
